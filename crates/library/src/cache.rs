//! On-disk cache of per-file tags and search strings.
//!
//! Entries live at `{root}/{bucket}/{entry}`: the bucket is the CRC-32 of the
//! file's parent directory, the entry the BLAKE3 digest of the relative path,
//! modification time, size and the fingerprint of the settings that shaped
//! the entry. Touching a file or changing those settings changes the entry
//! name, so a stale entry is never read back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use common::{bucket_id, join_relpath, parent_relpath, stable_id_of, MediaTags};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{decode_value, encode_value, LibraryError};

pub const CACHE_VERSION: u32 = 1;

/// Change indicator of a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileStamp {
    pub modified_nanos: u128,
    pub size: u64,
}

impl FileStamp {
    pub fn read(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        let modified_nanos = meta
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|value| value.as_nanos())
            .unwrap_or(0);
        Some(Self {
            modified_nanos,
            size: meta.len(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    bucket: String,
    entry: String,
}

impl CacheKey {
    /// `fingerprint` identifies the settings the entry was computed with,
    /// see [`settings_fingerprint`].
    pub fn new(relpath: &str, stamp: FileStamp, fingerprint: &str) -> Self {
        let modified = stamp.modified_nanos.to_string();
        let size = stamp.size.to_string();
        Self {
            bucket: bucket_id(parent_relpath(relpath)),
            entry: stable_id_of(&[relpath, &modified, &size, fingerprint]),
        }
    }

    /// `None` when the file cannot be stat'ed.
    pub fn for_file(root: &Path, relpath: &str, fingerprint: &str) -> Option<Self> {
        let stamp = FileStamp::read(&join_relpath(root, relpath))?;
        Some(Self::new(relpath, stamp, fingerprint))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }
}

/// Digest of the normalizer stages and prefix list that produce search strings.
pub fn settings_fingerprint(stages: &[&str], prefixes: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(stages.len() + prefixes.len() + 1);
    parts.extend_from_slice(stages);
    parts.push("\u{1e}");
    parts.extend(prefixes.iter().map(|prefix| prefix.as_str()));
    stable_id_of(&parts)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub tags: MediaTags,
    pub search_strings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct CacheStore {
    root: Option<PathBuf>,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Always misses, never writes.
    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn path_for(&self, key: &CacheKey) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(&key.bucket).join(&key.entry))
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                debug!("Cache read failed for {:?}: {}", path, err);
                return None;
            }
        };
        match decode_entry(&bytes) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                debug!("Cache entry {:?} has an old format", path);
                None
            }
            Err(err) => {
                debug!("Cache entry {:?} is unreadable: {}", path, err);
                None
            }
        }
    }

    /// Overwrites any existing entry. Writes a temporary sibling first so a
    /// reader never sees a partial file.
    pub fn store(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), LibraryError> {
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = encode_value(&(CACHE_VERSION, entry))?;
        let tmp = path.with_file_name(format!("{}.{}.tmp", key.entry, std::process::id()));
        if let Err(err) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), LibraryError> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        match fs::remove_dir_all(root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn decode_entry(bytes: &[u8]) -> Result<Option<CacheEntry>, LibraryError> {
    let version: u32 = decode_value(bytes)?;
    if version != CACHE_VERSION {
        return Ok(None);
    }
    let (_, entry): (u32, CacheEntry) = decode_value(bytes)?;
    Ok(Some(entry))
}
