use std::env;
use std::path::{Path, PathBuf};

use common::relpath_from;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Shape of the paths returned by [`FileIndexer::list`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
    Filenames,
    Relative,
    Absolute,
}

/// Recursive file lister with optional file name globs.
#[derive(Clone, Debug)]
pub struct FileIndexer {
    root: PathBuf,
    filters: Vec<String>,
    matcher: Option<GlobSet>,
}

impl FileIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filters: Vec::new(),
            matcher: None,
        }
    }

    /// Globs match the file name only, case-insensitively. Invalid globs are
    /// skipped; an empty list lists every file.
    pub fn with_filters<S: AsRef<str>>(root: impl Into<PathBuf>, filters: &[S]) -> Self {
        let mut indexer = Self::new(root);
        if filters.is_empty() {
            return indexer;
        }

        let mut builder = GlobSetBuilder::new();
        for filter in filters {
            let filter = filter.as_ref();
            match GlobBuilder::new(filter).case_insensitive(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                    indexer.filters.push(filter.to_string());
                }
                Err(err) => warn!("Ignoring file filter {:?}: {}", filter, err),
            }
        }
        indexer.matcher = match builder.build() {
            Ok(set) => Some(set),
            Err(err) => {
                warn!("Failed to build file filters: {}", err);
                Some(GlobSet::empty())
            }
        };
        indexer
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn is_valid(&self) -> bool {
        self.root.is_dir()
    }

    /// Same filters, rooted at `subdir` below the current root.
    pub fn clone_to(&self, subdir: impl AsRef<Path>) -> Self {
        Self {
            root: self.root.join(subdir),
            filters: self.filters.clone(),
            matcher: self.matcher.clone(),
        }
    }

    /// Regular files below the root, symlinks followed. `sort` orders the
    /// result by code point; otherwise the walk order is kept.
    pub fn list(&self, listing: Listing, sort: bool) -> Vec<String> {
        if !self.is_valid() {
            warn!("Media root {:?} is not a readable directory", self.root);
            return Vec::new();
        }

        let base = match listing {
            Listing::Absolute => absolute(&self.root),
            _ => self.root.clone(),
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(matcher) = &self.matcher {
                if !matcher.is_match(entry.file_name()) {
                    continue;
                }
            }
            let value = match listing {
                Listing::Filenames => Some(entry.file_name().to_string_lossy().into_owned()),
                Listing::Relative => relpath_from(&base, entry.path()),
                Listing::Absolute => Some(entry.path().to_string_lossy().into_owned()),
            };
            if let Some(value) = value {
                files.push(value);
            }
        }

        if sort {
            files.sort();
        }
        files
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relpath: &str) {
        let path = root.join(relpath);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/song.flac");
        touch(dir.path(), "a/Other.FLAC");
        touch(dir.path(), "a/notes.txt");
        touch(dir.path(), "Z.mp3");
        dir
    }

    #[test]
    fn lists_relative_paths_in_code_point_order() {
        let dir = tree();
        let indexer = FileIndexer::with_filters(dir.path(), &["*.flac", "*.mp3"]);
        assert_eq!(
            indexer.list(Listing::Relative, true),
            vec!["Z.mp3", "a/Other.FLAC", "b/song.flac"]
        );
    }

    #[test]
    fn no_filters_lists_everything() {
        let dir = tree();
        let indexer = FileIndexer::new(dir.path());
        assert_eq!(indexer.list(Listing::Relative, true).len(), 4);
        assert_eq!(
            indexer.list(Listing::Filenames, true),
            vec!["Other.FLAC", "Z.mp3", "notes.txt", "song.flac"]
        );
    }

    #[test]
    fn absolute_listing_points_into_root() {
        let dir = tree();
        let indexer = FileIndexer::with_filters(dir.path(), &["*.txt"]);
        let files = indexer.list(Listing::Absolute, false);
        assert_eq!(files.len(), 1);
        assert!(Path::new(&files[0]).is_absolute());
        assert!(Path::new(&files[0]).is_file());
    }

    #[test]
    fn clone_to_keeps_filters() {
        let dir = tree();
        let indexer = FileIndexer::with_filters(dir.path(), &["*.flac"]);
        let sub = indexer.clone_to("a");
        assert_eq!(sub.list(Listing::Relative, true), vec!["Other.FLAC"]);
        assert_eq!(indexer.root(), dir.path());
        assert_eq!(sub.filters(), indexer.filters());
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = FileIndexer::new(dir.path().join("missing"));
        assert!(!indexer.is_valid());
        assert!(indexer.list(Listing::Relative, true).is_empty());
    }

    #[test]
    fn invalid_filters_are_skipped() {
        let dir = tree();
        let indexer = FileIndexer::with_filters(dir.path(), &["[", "*.txt"]);
        assert_eq!(indexer.filters(), &["*.txt".to_string()]);
        assert_eq!(indexer.list(Listing::Relative, true), vec!["a/notes.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_directories() {
        let dir = tree();
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "linked.flac");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let indexer = FileIndexer::with_filters(dir.path(), &["*.flac"]);
        assert!(indexer
            .list(Listing::Relative, true)
            .contains(&"link/linked.flac".to_string()));
    }
}
