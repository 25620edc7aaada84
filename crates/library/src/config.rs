use std::path::PathBuf;

use common::MediaType;
use serde::{Deserialize, Serialize};

use crate::index::IndexOptions;

pub const DEFAULT_AUDIO_FORMATS: &[&str] = &[
    "*.wav", "*.flac", "*.tta", "*.aiff", "*.ape", "*.pcm", "*.alac", "*.dts", "*.m4a", "*.ogg",
    "*.mka", "*.wma", "*.asf", "*.ra", "*.aac", "*.mp3",
];

pub const DEFAULT_VIDEO_FORMATS: &[&str] = &[
    "*.mp4", "*.h264", "*.h263", "*.ts", "*.m2ts", "*.mov", "*.ogm", "*.avi", "*.bk2", "*.bnk",
    "*.mkv", "*.wmv", "*.rv",
];

pub const DEFAULT_MODULE_FORMATS: &[&str] = &["*.xm", "*.it", "*.mod", "*.med", "*.sid", "*.s3m"];

pub const DEFAULT_PREFIX_DELETION_PATTERNS: &str = "Music/;Video/;Videos/";

pub fn default_filters(media_type: MediaType) -> &'static [&'static str] {
    match media_type {
        MediaType::Audio => DEFAULT_AUDIO_FORMATS,
        MediaType::Video => DEFAULT_VIDEO_FORMATS,
        MediaType::Module => DEFAULT_MODULE_FORMATS,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub root: String,
    pub cache_dir: String,
    pub cache_enabled: bool,
    pub audio_formats: Vec<String>,
    pub video_formats: Vec<String>,
    pub module_formats: Vec<String>,
    pub prefix_deletion_patterns: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: "".to_string(),
            cache_dir: "cache".to_string(),
            cache_enabled: true,
            audio_formats: Vec::new(),
            video_formats: Vec::new(),
            module_formats: Vec::new(),
            prefix_deletion_patterns: parse_prefix_patterns(DEFAULT_PREFIX_DELETION_PATTERNS),
        }
    }
}

impl LibraryConfig {
    pub fn formats(&self, media_type: MediaType) -> &[String] {
        match media_type {
            MediaType::Audio => &self.audio_formats,
            MediaType::Video => &self.video_formats,
            MediaType::Module => &self.module_formats,
        }
    }

    /// Configured globs for `media_type`, or the built-in set when none are configured.
    pub fn filters(&self, media_type: MediaType) -> Vec<String> {
        let configured = parse_format_list(self.formats(media_type));
        if configured.is_empty() {
            default_filters(media_type)
                .iter()
                .map(|value| value.to_string())
                .collect()
        } else {
            configured
        }
    }

    pub fn index_options(&self) -> IndexOptions {
        let mut options = IndexOptions::default();
        for media_type in MediaType::ALL {
            options.set_filters(media_type, self.filters(media_type));
        }
        options.prefix_deletion_patterns = self
            .prefix_deletion_patterns
            .iter()
            .flat_map(|value| parse_prefix_patterns(value))
            .collect();
        options
    }

    pub fn cache_root(&self) -> Option<PathBuf> {
        let value = self.cache_dir.trim();
        if !self.cache_enabled || value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    }
}

/// Splits a `;` separated prefix list such as `"Music/;Video/"`.
pub fn parse_prefix_patterns(value: &str) -> Vec<String> {
    value
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

/// Accepts globs (`*.flac`), dotted (`.flac`) or bare (`flac`) extensions.
pub fn parse_format_list(values: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for value in values {
        for part in value.split(|ch: char| ch == ';' || ch == ',' || ch.is_whitespace()) {
            if part.is_empty() {
                continue;
            }
            let glob = if part.contains(['*', '?', '[']) {
                part.to_string()
            } else {
                format!("*.{}", part.trim_start_matches('.'))
            };
            if !out.contains(&glob) {
                out.push(glob);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_formats_fall_back_to_defaults() {
        let config = LibraryConfig::default();
        assert_eq!(config.filters(MediaType::Module).len(), DEFAULT_MODULE_FORMATS.len());
        assert!(config.filters(MediaType::Audio).contains(&"*.flac".to_string()));
        assert!(config.filters(MediaType::Video).contains(&"*.mkv".to_string()));
    }

    #[test]
    fn format_list_accepts_extensions() {
        let values = vec!["flac; .mp3".to_string(), "*.ogg,flac".to_string()];
        assert_eq!(
            parse_format_list(&values),
            vec!["*.flac".to_string(), "*.mp3".to_string(), "*.ogg".to_string()]
        );
    }

    #[test]
    fn prefix_patterns_use_semicolons() {
        assert_eq!(
            parse_prefix_patterns(DEFAULT_PREFIX_DELETION_PATTERNS),
            vec!["Music/".to_string(), "Video/".to_string(), "Videos/".to_string()]
        );
        assert!(parse_prefix_patterns(";;").is_empty());
    }

    #[test]
    fn legacy_prefix_string_is_split() {
        let config = LibraryConfig {
            prefix_deletion_patterns: vec!["A/;B/".to_string(), "C/".to_string()],
            ..LibraryConfig::default()
        };
        assert_eq!(
            config.index_options().prefix_deletion_patterns,
            vec!["A/".to_string(), "B/".to_string(), "C/".to_string()]
        );
    }

    #[test]
    fn disabled_cache_has_no_root() {
        let mut config = LibraryConfig::default();
        assert_eq!(config.cache_root(), Some(PathBuf::from("cache")));
        config.cache_enabled = false;
        assert_eq!(config.cache_root(), None);
    }
}
