use std::path::Path;

use common::MediaTags;
use lofty::error::LoftyError;
use lofty::prelude::{ItemKey, TaggedFileExt};
use lofty::tag::Tag;
use tracing::debug;

/// Source of tag bundles for indexed files.
///
/// Implementations never fail: an unreadable or untagged file yields an
/// empty bundle.
pub trait TagReader {
    fn read_tags(&self, path: &Path) -> MediaTags;
}

impl<F> TagReader for F
where
    F: Fn(&Path) -> MediaTags,
{
    fn read_tags(&self, path: &Path) -> MediaTags {
        self(path)
    }
}

/// Reads tags from media file headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> MediaTags {
        match read_media_tags(path) {
            Ok(tags) => tags,
            Err(err) => {
                debug!("No tags for {:?}: {}", path, err);
                MediaTags::default()
            }
        }
    }
}

/// Never touches the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTags;

impl TagReader for NoTags {
    fn read_tags(&self, _path: &Path) -> MediaTags {
        MediaTags::default()
    }
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

pub fn read_media_tags(path: &Path) -> Result<MediaTags, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a regular file",
        )));
    }
    let tagged_file = lofty::read_from_path(path)?;
    let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => tag,
        None => return Ok(MediaTags::default()),
    };
    Ok(tags_from(tag))
}

fn tags_from(tag: &Tag) -> MediaTags {
    let album_artist = tag_text(tag, &ItemKey::AlbumArtist);
    let track_artist = tag_text(tag, &ItemKey::TrackArtist);
    MediaTags {
        artist: track_artist.or(album_artist).unwrap_or_default(),
        album: tag_text(tag, &ItemKey::AlbumTitle).unwrap_or_default(),
        title: tag_text(tag, &ItemKey::TrackTitle).unwrap_or_default(),
        genre: tag_text(tag, &ItemKey::Genre)
            .map(|value| clean_genre(&value))
            .unwrap_or_default(),
    }
}

fn tag_text(tag: &Tag, key: &ItemKey) -> Option<String> {
    let value = tag.get_string(key)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ID3v2.4 stores multiple genres NUL separated.
fn clean_genre(text: &str) -> String {
    let parts: Vec<&str> = text
        .split('\0')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    parts.join("; ")
}
