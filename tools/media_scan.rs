mod config;

use std::env;
use std::path::PathBuf;

use common::MediaType;
use library::{find_all, find_first, BuildStats, IndexBuilder, Media, RandomStream};
use query::Query;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::ConfigFile;

const USAGE: &str =
    "usage: media_scan [--json] [--config FILE] [--root DIR] [--no-cache] [--type audio|video|module] [--all|--random] [QUERY]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    First,
    All,
    Random,
}

#[derive(Debug)]
struct Args {
    json: bool,
    config: Option<PathBuf>,
    root: Option<PathBuf>,
    no_cache: bool,
    filter: Option<MediaType>,
    mode: Mode,
    term: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        json: false,
        config: None,
        root: None,
        no_cache: false,
        filter: None,
        mode: Mode::First,
        term: String::new(),
    };
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--no-cache" => parsed.no_cache = true,
            "--all" => parsed.mode = Mode::All,
            "--random" => parsed.mode = Mode::Random,
            "--config" => {
                let value = args.next().ok_or("--config needs a file")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--root" => {
                let value = args.next().ok_or("--root needs a directory")?;
                parsed.root = Some(PathBuf::from(value));
            }
            "--type" => {
                let value = args.next().ok_or("--type needs a value")?;
                parsed.filter = MediaType::parse(&value);
                if parsed.filter.is_none() {
                    warn!("Unknown media type {:?}; searching every type", value);
                }
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => words.push(arg),
        }
    }
    parsed.term = words.join(" ");
    Ok(parsed)
}

#[derive(Serialize)]
struct Report<'a> {
    stats: &'a BuildStats,
    query: &'a str,
    results: Vec<&'a Media>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;

    let config_file = ConfigFile::locate(args.config.clone());
    let (config, created) = config_file.load_or_create()?;
    if created {
        info!("Created default config at {:?}", config_file.path());
    } else {
        info!("Loaded config from {:?}", config_file.path());
    }

    let root = args
        .root
        .clone()
        .or_else(|| env::var("MEDIA_ROOT").ok().map(PathBuf::from))
        .or_else(|| config_file.media_root(&config))
        .ok_or("no media root: set `root` in the config, MEDIA_ROOT, or pass --root")?;

    let cache = config_file.cache_store(&config, args.no_cache);
    let builder = IndexBuilder::new(config.index_options()).with_cache(cache);
    let (index, stats) = builder.build(root);

    let query = Query::compile(&args.term);
    let results: Vec<&Media> = match args.mode {
        _ if args.term.trim().is_empty() && args.mode != Mode::Random => Vec::new(),
        Mode::First => find_first(&index, &query, args.filter).into_iter().collect(),
        Mode::All => find_all(&index, &query, args.filter),
        Mode::Random => {
            let mut stream = RandomStream::new();
            let picked = if args.term.trim().is_empty() {
                stream.pick(&index, args.filter)
            } else {
                stream.pick_matching(&index, &query, args.filter)
            };
            picked.into_iter().collect()
        }
    };

    if args.json {
        let report = Report {
            stats: &stats,
            query: &args.term,
            results,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for media_type in MediaType::ALL {
        println!("{:>7}: {}", media_type.as_str(), index.count(Some(media_type)));
    }
    if args.term.trim().is_empty() && args.mode != Mode::Random {
        return Ok(());
    }
    if results.is_empty() {
        println!("No match for {:?}", args.term);
    }
    for media in results {
        println!("[{}] {}", media.media_type(), media.path_in(index.root()).display());
    }

    Ok(())
}
