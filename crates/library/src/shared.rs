use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::info;

use crate::index::{BuildStats, IndexBuilder, MediaIndex};

/// Index handle shared between threads. Readers block while a rescan holds
/// the write lock, so nobody observes a half-built index.
#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<MediaIndex>>,
}

impl SharedIndex {
    pub fn new(index: MediaIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MediaIndex> {
        self.inner.read()
    }

    /// `None` while a rescan is running.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, MediaIndex>> {
        self.inner.try_read()
    }

    pub fn is_rescanning(&self) -> bool {
        self.inner.is_locked_exclusive()
    }

    pub fn rescan(&self, builder: &IndexBuilder) -> BuildStats {
        let mut index = self.inner.write();
        info!("Rescanning {:?}", index.root());
        index.rescan(builder)
    }
}
