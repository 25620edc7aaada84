pub mod cache;
pub mod config;
pub mod index;
pub mod random;
pub mod search;
pub mod shared;
pub mod walker;

use serde::{Deserialize, Serialize};

pub use cache::{CacheEntry, CacheKey, CacheStore, FileStamp, CACHE_VERSION};
pub use config::LibraryConfig;
pub use index::{BuildStats, IndexBuilder, IndexOptions, Media, MediaId, MediaIndex};
pub use random::RandomStream;
pub use search::{find_all, find_all_ids, find_first};
pub use shared::SharedIndex;
pub use walker::{FileIndexer, Listing};

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Bincode(err) => write!(f, "bincode error: {}", err),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<Box<bincode::ErrorKind>> for LibraryError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        LibraryError::Bincode(err)
    }
}

fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, LibraryError> {
    Ok(bincode::serialize(value)?)
}

fn decode_value<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, LibraryError> {
    Ok(bincode::deserialize(bytes)?)
}
