use std::path::{Path, PathBuf};
use std::time::Instant;

use common::{file_extension, join_relpath, MediaTags, MediaType};
use metadata::{LoftyTagReader, TagReader};
use normalize::{dedup_in_order, Pipeline};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{settings_fingerprint, CacheEntry, CacheKey, CacheStore};
use crate::config::{default_filters, parse_prefix_patterns, DEFAULT_PREFIX_DELETION_PATTERNS};
use crate::walker::{FileIndexer, Listing};

/// Lowercase markers of instrumental and off-vocal tracks.
const INSTRUMENTAL_MARKERS: &[&str] = &[
    "instrumental",
    "ｉｎｓｔｒｕｍｅｎｔａｌ",
    "off vocal",
    "ｏｆｆ ｖｏｃａｌ",
    "ｏｆｆ\u{3000}ｖｏｃａｌ",
];

/// Position of a record in the finalized master list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaId(usize);

impl MediaId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Media {
    id: MediaId,
    media_type: MediaType,
    relpath: String,
    extension: String,
    tags: MediaTags,
    search_strings: Vec<String>,
}

impl Media {
    fn new(media_type: MediaType, relpath: String, entry: CacheEntry) -> Self {
        Self {
            id: MediaId(0),
            media_type,
            extension: file_extension(&relpath),
            relpath,
            tags: entry.tags,
            search_strings: entry.search_strings,
        }
    }

    pub fn id(&self) -> MediaId {
        self.id
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Slash separated, relative to the library root.
    pub fn relpath(&self) -> &str {
        &self.relpath
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tags(&self) -> &MediaTags {
        &self.tags
    }

    pub fn genre(&self) -> &str {
        &self.tags.genre
    }

    pub fn search_strings(&self) -> &[String] {
        &self.search_strings
    }

    pub fn is_instrumental(&self) -> bool {
        is_instrumental(&self.relpath)
    }

    pub fn path_in(&self, root: &Path) -> PathBuf {
        join_relpath(root, &self.relpath)
    }
}

pub fn is_instrumental(path: &str) -> bool {
    let lower = path.to_lowercase();
    INSTRUMENTAL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Moves instrumental records behind all others, keeping relative order.
pub fn partition_instrumental(records: Vec<Media>) -> (Vec<Media>, usize) {
    let (mut main, instrumental): (Vec<Media>, Vec<Media>) = records
        .into_iter()
        .partition(|media| !media.is_instrumental());
    let moved = instrumental.len();
    main.extend(instrumental);
    (main, moved)
}

/// Longest configured prefix of `relpath` removed; the path itself when none
/// matches or nothing would remain.
pub fn strip_longest_prefix<'a>(relpath: &'a str, prefixes: &[String]) -> &'a str {
    prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty() && relpath.starts_with(prefix.as_str()))
        .max_by_key(|prefix| prefix.len())
        .map(|prefix| &relpath[prefix.len()..])
        .filter(|rest| !rest.is_empty())
        .unwrap_or(relpath)
}

#[derive(Clone, Debug)]
pub struct IndexOptions {
    audio_filters: Vec<String>,
    video_filters: Vec<String>,
    module_filters: Vec<String>,
    pub prefix_deletion_patterns: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            audio_filters: default_filter_list(MediaType::Audio),
            video_filters: default_filter_list(MediaType::Video),
            module_filters: default_filter_list(MediaType::Module),
            prefix_deletion_patterns: parse_prefix_patterns(DEFAULT_PREFIX_DELETION_PATTERNS),
        }
    }
}

impl IndexOptions {
    pub fn filters(&self, media_type: MediaType) -> &[String] {
        match media_type {
            MediaType::Audio => &self.audio_filters,
            MediaType::Video => &self.video_filters,
            MediaType::Module => &self.module_filters,
        }
    }

    /// An empty list restores the built-in filters for that type.
    pub fn set_filters(&mut self, media_type: MediaType, filters: Vec<String>) {
        let filters = if filters.is_empty() {
            default_filter_list(media_type)
        } else {
            filters
        };
        match media_type {
            MediaType::Audio => self.audio_filters = filters,
            MediaType::Video => self.video_filters = filters,
            MediaType::Module => self.module_filters = filters,
        }
    }
}

fn default_filter_list(media_type: MediaType) -> Vec<String> {
    default_filters(media_type)
        .iter()
        .map(|value| value.to_string())
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub audio: usize,
    pub video: usize,
    pub module: usize,
    pub instrumental: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_write_failures: usize,
}

impl BuildStats {
    pub fn count(&self, media_type: MediaType) -> usize {
        match media_type {
            MediaType::Audio => self.audio,
            MediaType::Video => self.video,
            MediaType::Module => self.module,
        }
    }

    pub fn total(&self) -> usize {
        self.audio + self.video + self.module
    }

    fn add(&mut self, media_type: MediaType, found: usize) {
        match media_type {
            MediaType::Audio => self.audio += found,
            MediaType::Video => self.video += found,
            MediaType::Module => self.module += found,
        }
    }
}

/// Turns a directory tree into a [`MediaIndex`].
pub struct IndexBuilder {
    options: IndexOptions,
    cache: CacheStore,
    pipeline: Pipeline,
    tags: Box<dyn TagReader + Send + Sync>,
}

impl IndexBuilder {
    /// No cache, the default normalizer pipeline and lofty tags.
    pub fn new(options: IndexOptions) -> Self {
        Self {
            options,
            cache: CacheStore::disabled(),
            pipeline: Pipeline::with_defaults(),
            tags: Box::new(LoftyTagReader),
        }
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_tag_reader<T: TagReader + Send + Sync + 'static>(mut self, tags: T) -> Self {
        self.tags = Box::new(tags);
        self
    }

    pub fn build(&self, root: impl Into<PathBuf>) -> (MediaIndex, BuildStats) {
        let mut index = MediaIndex::new(root);
        let stats = self.fill(&mut index);
        (index, stats)
    }

    fn fill(&self, index: &mut MediaIndex) -> BuildStats {
        let started = Instant::now();
        let mut stats = BuildStats::default();
        let mut records = Vec::new();
        let fingerprint = settings_fingerprint(
            &self.pipeline.stage_names(),
            &self.options.prefix_deletion_patterns,
        );

        for media_type in MediaType::ALL {
            let indexer = FileIndexer::with_filters(&index.root, self.options.filters(media_type));
            let relpaths = indexer.list(Listing::Relative, true);
            stats.add(media_type, relpaths.len());
            for relpath in relpaths {
                let media = self.describe(&index.root, media_type, relpath, &fingerprint, &mut stats);
                records.push(media);
            }
        }

        let (mut records, instrumental) = partition_instrumental(records);
        stats.instrumental = instrumental;
        for (pos, media) in records.iter_mut().enumerate() {
            media.id = MediaId(pos);
        }
        for media in &records {
            index.views[view_slot(media.media_type)].push(media.id);
        }
        index.records = records;

        info!(
            "Indexed {} files ({} audio, {} video, {} module) in {:?}; cache {} hits, {} misses",
            stats.total(),
            stats.audio,
            stats.video,
            stats.module,
            started.elapsed(),
            stats.cache_hits,
            stats.cache_misses
        );
        stats
    }

    fn describe(
        &self,
        root: &Path,
        media_type: MediaType,
        relpath: String,
        fingerprint: &str,
        stats: &mut BuildStats,
    ) -> Media {
        let key = if self.cache.is_enabled() {
            CacheKey::for_file(root, &relpath, fingerprint)
        } else {
            None
        };
        if let Some(entry) = key.as_ref().and_then(|key| self.cache.lookup(key)) {
            stats.cache_hits += 1;
            return Media::new(media_type, relpath, entry);
        }
        stats.cache_misses += 1;

        let cleaned = strip_longest_prefix(&relpath, &self.options.prefix_deletion_patterns);
        let mut search_strings = self.pipeline.run(cleaned);
        let tags = self.tags.read_tags(&join_relpath(root, &relpath));
        if let Some(line) = tags.search_line() {
            search_strings.push(line);
        }
        dedup_in_order(&mut search_strings);

        let entry = CacheEntry {
            tags,
            search_strings,
        };
        if let Some(key) = &key {
            if let Err(err) = self.cache.store(key, &entry) {
                stats.cache_write_failures += 1;
                warn!("Failed to cache {}: {}", relpath, err);
            }
        }
        Media::new(media_type, relpath, entry)
    }
}

fn view_slot(media_type: MediaType) -> usize {
    match media_type {
        MediaType::Audio => 0,
        MediaType::Video => 1,
        MediaType::Module => 2,
    }
}

/// Owns every [`Media`] record; views and results refer to them by [`MediaId`].
#[derive(Clone, Debug)]
pub struct MediaIndex {
    root: PathBuf,
    records: Vec<Media>,
    views: [Vec<MediaId>; 3],
}

impl MediaIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: Vec::new(),
            views: Default::default(),
        }
    }

    /// Drops every record and view, then builds again from the same root.
    pub fn rescan(&mut self, builder: &IndexBuilder) -> BuildStats {
        self.clear();
        builder.fill(self)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        for view in &mut self.views {
            view.clear();
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, filter: Option<MediaType>) -> usize {
        match filter {
            Some(media_type) => self.view(media_type).len(),
            None => self.records.len(),
        }
    }

    /// The `pos`-th record of the type view, or of the master list without a filter.
    pub fn at(&self, pos: usize, filter: Option<MediaType>) -> Option<&Media> {
        match filter {
            Some(media_type) => self.get(*self.view(media_type).get(pos)?),
            None => self.records.get(pos),
        }
    }

    pub fn get(&self, id: MediaId) -> Option<&Media> {
        self.records.get(id.0)
    }

    pub fn view(&self, media_type: MediaType) -> &[MediaId] {
        &self.views[view_slot(media_type)]
    }

    pub fn records(&self) -> &[Media] {
        &self.records
    }

    pub fn iter(&self, filter: Option<MediaType>) -> Iter<'_> {
        Iter {
            records: &self.records,
            view: filter.map(|media_type| self.view(media_type)),
            pos: 0,
        }
    }
}

/// Records in index order, optionally restricted to one type.
pub struct Iter<'a> {
    records: &'a [Media],
    view: Option<&'a [MediaId]>,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Media;

    fn next(&mut self) -> Option<&'a Media> {
        let media = match self.view {
            Some(view) => self.records.get(view.get(self.pos)?.0)?,
            None => self.records.get(self.pos)?,
        };
        self.pos += 1;
        Some(media)
    }
}
