use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const KEY_SEP: char = '\x1f';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
    Module,
}

impl MediaType {
    /// Scan order. Index output ordering depends on it.
    pub const ALL: [MediaType; 3] = [MediaType::Audio, MediaType::Video, MediaType::Module];

    /// Unknown tokens yield `None`, which callers treat as "no type filter".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "audio" | "music" | "a" => Some(Self::Audio),
            "video" | "videos" | "movie" | "v" => Some(Self::Video),
            "module" | "mod" | "tracker" | "moduletracker" | "m" => Some(Self::Module),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Module => "module",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTags {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
}

impl MediaTags {
    pub fn is_empty(&self) -> bool {
        self.artist.is_empty()
            && self.album.is_empty()
            && self.title.is_empty()
            && self.genre.is_empty()
    }

    /// "artist album title", or `None` when all three are empty. Genre is ignored.
    pub fn search_line(&self) -> Option<String> {
        if self.artist.is_empty() && self.album.is_empty() && self.title.is_empty() {
            return None;
        }
        Some(format!("{} {} {}", self.artist, self.album, self.title))
    }
}

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

/// BLAKE3 over the parts joined with a unit separator.
pub fn stable_id_of(parts: &[&str]) -> String {
    let mut joined = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            joined.push(KEY_SEP);
        }
        joined.push_str(part);
    }
    stable_id(&joined)
}

/// CRC-32 rendered as 8 lowercase hex digits.
pub fn bucket_id(input: &str) -> String {
    format!("{:08x}", crc32fast::hash(input.as_bytes()))
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

pub fn join_relpath(root: &Path, relpath: &str) -> PathBuf {
    let mut out = PathBuf::from(root);
    for part in relpath.split('/') {
        if part.is_empty() {
            continue;
        }
        out.push(part);
    }
    out
}

/// Directory portion of a slash separated relative path; empty for top-level files.
pub fn parent_relpath(relpath: &str) -> &str {
    match relpath.rfind('/') {
        Some(idx) => &relpath[..idx],
        None => "",
    }
}

pub fn file_name(relpath: &str) -> &str {
    match relpath.rfind('/') {
        Some(idx) => &relpath[idx + 1..],
        None => relpath,
    }
}

/// Lowercased text after the last dot of the file name.
pub fn file_extension(relpath: &str) -> String {
    let name = file_name(relpath);
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}
