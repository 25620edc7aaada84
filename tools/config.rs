use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use library::{CacheStore, LibraryConfig};

pub const CONFIG_ENV: &str = "MEDIA_CONFIG";
pub const CONFIG_NAME: &str = "media_scan.yaml";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
    Render(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => write!(f, "cannot read {:?}: {}", path, source),
            ConfigError::Write { path, source } => write!(f, "cannot write {:?}: {}", path, source),
            ConfigError::Parse { path, source } => write!(f, "invalid config {:?}: {}", path, source),
            ConfigError::Render(err) => write!(f, "cannot render config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Render(err) => Some(err),
        }
    }
}

/// The YAML file the scanner reads its library settings from. Relative
/// paths inside it are resolved against its directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `explicit`, then `MEDIA_CONFIG`, then `media_scan.yaml` in the working
    /// directory if present, else next to the executable.
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let from_env = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());
        if let Some(path) = explicit.or(from_env) {
            return Self::at(path);
        }
        let local = PathBuf::from(CONFIG_NAME);
        if local.is_file() {
            return Self::at(local);
        }
        let beside_exe = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_NAME)));
        Self::at(beside_exe.unwrap_or(local))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Returns the config and whether a default file was written. An empty
    /// file reads as the defaults.
    pub fn load_or_create(&self) -> Result<(LibraryConfig, bool), ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = LibraryConfig::default();
                self.save(&config)?;
                return Ok((config, true));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok((LibraryConfig::default(), false));
        }
        let config = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok((config, false))
    }

    pub fn save(&self, config: &LibraryConfig) -> Result<(), ConfigError> {
        let contents = serde_yaml::to_string(config).map_err(ConfigError::Render)?;
        let write = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        fs::create_dir_all(self.dir()).map_err(write)?;
        fs::write(&self.path, contents).map_err(write)
    }

    /// `None` for a blank value.
    pub fn resolve(&self, value: &str) -> Option<PathBuf> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let path = Path::new(value);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(self.dir().join(path))
        }
    }

    /// The configured media root, if any.
    pub fn media_root(&self, config: &LibraryConfig) -> Option<PathBuf> {
        self.resolve(&config.root)
    }

    /// Disabled when caching is off or `disable` is set.
    pub fn cache_store(&self, config: &LibraryConfig, disable: bool) -> CacheStore {
        let root = config
            .cache_root()
            .filter(|_| !disable)
            .and_then(|_| self.resolve(&config.cache_dir));
        match root {
            Some(root) => CacheStore::new(root),
            None => CacheStore::disabled(),
        }
    }
}
