use common::MediaType;
use query::Query;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::index::{Media, MediaId, MediaIndex};
use crate::search::find_all_ids;

/// Uniform picks that never repeat the previous pick of the same stream
/// while the pool has more than one record.
#[derive(Debug)]
pub struct RandomStream<R = StdRng> {
    rng: R,
    last: Option<MediaId>,
}

impl RandomStream<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomStream<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomStream<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, last: None }
    }

    pub fn last(&self) -> Option<MediaId> {
        self.last
    }

    pub fn forget(&mut self) {
        self.last = None;
    }

    pub fn pick<'a>(&mut self, index: &'a MediaIndex, filter: Option<MediaType>) -> Option<&'a Media> {
        match filter {
            Some(media_type) => self.pick_from(index, index.view(media_type)),
            None => {
                let previous = self.last.map(MediaId::index).filter(|&pos| pos < index.len());
                let pos = self.draw(index.len(), previous)?;
                let media = index.at(pos, None)?;
                self.last = Some(media.id());
                Some(media)
            }
        }
    }

    pub fn pick_matching<'a>(
        &mut self,
        index: &'a MediaIndex,
        query: &Query,
        filter: Option<MediaType>,
    ) -> Option<&'a Media> {
        let pool = find_all_ids(index, query, filter);
        self.pick_from(index, &pool)
    }

    pub fn pick_from<'a>(&mut self, index: &'a MediaIndex, pool: &[MediaId]) -> Option<&'a Media> {
        let previous = self
            .last
            .and_then(|last| pool.iter().position(|id| *id == last));
        let id = pool[self.draw(pool.len(), previous)?];
        self.last = Some(id);
        index.get(id)
    }

    /// Position in `0..len`, never `previous` unless it is the only one.
    fn draw(&mut self, len: usize, previous: Option<usize>) -> Option<usize> {
        match (len, previous) {
            (0, _) => None,
            (1, _) => Some(0),
            (len, Some(skip)) => {
                let pos = self.rng.random_range(0..len - 1);
                Some(if pos >= skip { pos + 1 } else { pos })
            }
            (len, None) => Some(self.rng.random_range(0..len)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, IndexOptions};
    use metadata::NoTags;
    use std::collections::HashSet;
    use std::fs;

    fn library(files: &[&str]) -> (tempfile::TempDir, MediaIndex) {
        let dir = tempfile::tempdir().unwrap();
        for relpath in files {
            let path = dir.path().join(relpath);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"x").unwrap();
        }
        let (index, _) = IndexBuilder::new(IndexOptions::default())
            .with_tag_reader(NoTags)
            .build(dir.path());
        (dir, index)
    }

    #[test]
    fn never_repeats_with_two_or_more() {
        let (_dir, index) = library(&["a.flac", "b.flac", "c.flac", "d.mkv"]);
        let mut stream = RandomStream::seeded(7);
        let mut previous = None;
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let media = stream.pick(&index, Some(MediaType::Audio)).unwrap();
            assert_ne!(Some(media.id()), previous);
            assert_eq!(media.media_type(), MediaType::Audio);
            previous = Some(media.id());
            seen.insert(media.id());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn two_records_alternate() {
        let (_dir, index) = library(&["a.flac", "b.flac"]);
        let mut stream = RandomStream::seeded(1);
        let first = stream.pick(&index, None).unwrap().id();
        let second = stream.pick(&index, None).unwrap().id();
        let third = stream.pick(&index, None).unwrap().id();
        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn unfiltered_picks_cover_every_type() {
        let (_dir, index) = library(&["a.flac", "b.flac", "c.mkv", "d.mod"]);
        let mut stream = RandomStream::seeded(13);
        let mut previous = None;
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let media = stream.pick(&index, None).unwrap();
            assert_ne!(Some(media.id()), previous);
            previous = Some(media.id());
            seen.insert(media.media_type());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn stale_previous_pick_is_ignored() {
        let (_dir, big) = library(&["a.flac", "b.flac", "c.flac", "d.flac"]);
        let (_small_dir, small) = library(&["a.flac", "b.flac"]);
        let mut stream = RandomStream::seeded(17);
        while stream.pick(&big, None).unwrap().id().index() < small.len() {}
        let picked = stream.pick(&small, None).unwrap();
        assert!(picked.id().index() < small.len());
        assert_eq!(stream.last(), Some(picked.id()));
    }

    #[test]
    fn single_record_repeats() {
        let (_dir, index) = library(&["a.flac"]);
        let mut stream = RandomStream::seeded(3);
        let first = stream.pick(&index, None).unwrap().id();
        assert_eq!(stream.pick(&index, None).unwrap().id(), first);
    }

    #[test]
    fn empty_pool_is_none() {
        let (_dir, index) = library(&["a.flac"]);
        let mut stream = RandomStream::seeded(3);
        assert!(stream.pick(&index, Some(MediaType::Video)).is_none());
        assert!(stream
            .pick_matching(&index, &Query::compile("missing"), None)
            .is_none());
        assert!(stream
            .pick_matching(&index, &Query::compile("*"), None)
            .is_none());
    }

    #[test]
    fn matching_picks_stay_in_the_result_set() {
        let (_dir, index) = library(&["song a.flac", "song b.flac", "other.flac"]);
        let query = Query::compile("song");
        let mut stream = RandomStream::seeded(11);
        let mut previous = None;
        for _ in 0..100 {
            let media = stream.pick_matching(&index, &query, None).unwrap();
            assert!(media.relpath().starts_with("song"));
            assert_ne!(Some(media.id()), previous);
            previous = Some(media.id());
        }
    }

    #[test]
    fn streams_do_not_share_state() {
        let (_dir, index) = library(&["a.flac", "b.flac"]);
        let mut first = RandomStream::seeded(5);
        let mut second = RandomStream::seeded(5);
        let a = first.pick(&index, None).unwrap().id();
        assert_eq!(second.pick(&index, None).unwrap().id(), a);
        assert_eq!(first.last(), Some(a));
        first.forget();
        assert_eq!(first.last(), None);
    }
}
