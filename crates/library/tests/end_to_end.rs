use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{MediaTags, MediaType};
use library::{find_all, find_first, CacheStore, IndexBuilder, IndexOptions, MediaIndex, RandomStream};
use metadata::NoTags;
use query::Query;

fn write(root: &Path, relpath: &str, contents: &[u8]) {
    let path = root.join(relpath);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn flac_only() -> IndexOptions {
    let mut options = IndexOptions::default();
    options.set_filters(MediaType::Audio, vec!["*.flac".to_string()]);
    options
}

fn snapshot(index: &MediaIndex) -> Vec<(String, MediaTags, Vec<String>)> {
    index
        .iter(None)
        .map(|media| {
            (
                media.relpath().to_string(),
                media.tags().clone(),
                media.search_strings().to_vec(),
            )
        })
        .collect()
}

#[test]
fn finds_the_vocal_track_first() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Music/Artist - Song (instrumental).flac", b"a");
    write(dir.path(), "Music/Artist - Song.flac", b"b");
    write(dir.path(), "Music/cover.jpg", b"c");

    let (index, stats) = IndexBuilder::new(flac_only())
        .with_tag_reader(NoTags)
        .build(dir.path());
    assert_eq!(stats.audio, 2);
    assert_eq!(stats.instrumental, 1);
    assert_eq!(index.count(Some(MediaType::Audio)), 2);

    let query = Query::compile("song");
    let first = find_first(&index, &query, Some(MediaType::Audio)).unwrap();
    assert_eq!(first.relpath(), "Music/Artist - Song.flac");
    assert_eq!(find_all(&index, &query, Some(MediaType::Audio)).len(), 2);
    assert!(index.at(1, Some(MediaType::Audio)).unwrap().is_instrumental());

    let mut stream = RandomStream::seeded(42);
    for _ in 0..50 {
        assert!(stream
            .pick_matching(&index, &query, Some(MediaType::Audio))
            .is_some());
    }
}

#[test]
fn warm_cache_matches_cold_build() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    write(&media, "Music/Artist/01 さくら.flac", b"one");
    write(&media, "Music/Ａｒｔｉｓｔ/02 Ｓｏｎｇ.flac", b"two");
    write(&media, "Video/clip.mkv", b"three");

    let reads = Arc::new(AtomicUsize::new(0));
    let reader = {
        let reads = Arc::clone(&reads);
        move |path: &Path| {
            reads.fetch_add(1, Ordering::SeqCst);
            MediaTags {
                artist: "Artist".to_string(),
                title: path.file_stem().unwrap().to_string_lossy().into_owned(),
                ..MediaTags::default()
            }
        }
    };
    let builder = IndexBuilder::new(IndexOptions::default())
        .with_cache(CacheStore::new(dir.path().join("cache")))
        .with_tag_reader(reader);

    let (cold, cold_stats) = builder.build(&media);
    assert_eq!(cold_stats.cache_misses, 3);
    assert_eq!(cold_stats.cache_hits, 0);
    assert_eq!(reads.load(Ordering::SeqCst), 3);

    let (warm, warm_stats) = builder.build(&media);
    assert_eq!(warm_stats.cache_hits, 3);
    assert_eq!(warm_stats.cache_misses, 0);
    assert_eq!(reads.load(Ordering::SeqCst), 3);
    assert_eq!(snapshot(&cold), snapshot(&warm));
}

#[test]
fn changed_files_bypass_stale_entries() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    write(&media, "a.flac", b"one");
    write(&media, "b.flac", b"two");

    let genre = Arc::new(parking_lot::Mutex::new("Pop".to_string()));
    let reader = {
        let genre = Arc::clone(&genre);
        move |_: &Path| MediaTags {
            genre: genre.lock().clone(),
            ..MediaTags::default()
        }
    };
    let builder = IndexBuilder::new(flac_only())
        .with_cache(CacheStore::new(dir.path().join("cache")))
        .with_tag_reader(reader);
    let (mut index, _) = builder.build(&media);

    *genre.lock() = "Rock".to_string();
    write(&media, "a.flac", b"one, but longer");
    let stats = index.rescan(&builder);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 1);

    let genres: Vec<&str> = index.iter(None).map(|media| media.genre()).collect();
    assert_eq!(genres, vec!["Rock", "Pop"]);
}

#[test]
fn excluded_terms_never_come_back() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "term one.flac",
        "term BadWord two.flac",
        "badword/term three.flac",
        "term four.flac",
    ] {
        write(dir.path(), name, b"x");
    }
    let (index, _) = IndexBuilder::new(flac_only())
        .with_tag_reader(NoTags)
        .build(dir.path());

    let query = Query::compile("term|wo badword");
    let found = find_all(&index, &query, None);
    assert_eq!(found.len(), 2);
    for media in &found {
        assert!(!media.relpath().to_lowercase().contains("badword"));
    }

    let mut stream = RandomStream::seeded(9);
    for _ in 0..50 {
        let media = stream.pick_matching(&index, &query, None).unwrap();
        assert!(!media.relpath().to_lowercase().contains("badword"));
    }
}

#[test]
fn unwritable_cache_still_builds() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    write(&media, "Music/song.flac", b"x");
    let blocker = dir.path().join("cache");
    fs::write(&blocker, b"not a directory").unwrap();

    let builder = IndexBuilder::new(flac_only())
        .with_cache(CacheStore::new(&blocker))
        .with_tag_reader(NoTags);
    let (index, stats) = builder.build(&media);
    assert_eq!(index.len(), 1);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.cache_write_failures, 1);
    assert!(find_first(&index, &Query::compile("song"), None).is_some());
    assert!(blocker.is_file());
}

#[test]
fn changed_prefixes_bypass_cached_search_strings() {
    let dir = tempfile::tempdir().unwrap();
    let media = dir.path().join("media");
    write(&media, "Music/Anime/opening.flac", b"x");
    let cache = CacheStore::new(dir.path().join("cache"));

    let mut options = flac_only();
    options.prefix_deletion_patterns = vec!["Music/".to_string()];
    let builder = IndexBuilder::new(options.clone())
        .with_cache(cache.clone())
        .with_tag_reader(NoTags);
    let (index, _) = builder.build(&media);
    assert_eq!(index.at(0, None).unwrap().search_strings()[0], "Anime/opening.flac");

    options.prefix_deletion_patterns = vec!["Music/Anime/".to_string()];
    let builder = IndexBuilder::new(options)
        .with_cache(cache)
        .with_tag_reader(NoTags);
    let (index, stats) = builder.build(&media);
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(index.at(0, None).unwrap().search_strings()[0], "opening.flac");
    assert!(find_first(&index, &Query::compile("anime"), None).is_none());

    let (_, stats) = builder.build(&media);
    assert_eq!(stats.cache_hits, 1);
}
