//! Filesystem cache backend
//!
//! Stores each response body as a plain text file named after its cache key.
//! There is no expiry metadata; entries live until something outside this
//! crate removes them.

use std::fs;
use std::path::{Path, PathBuf};

use super::{CacheError, CacheKey};
use crate::config::ConfigError;

/// Reads and writes cached response bodies in a single directory
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileCache {
    /// Creates a FileCache rooted at an existing directory
    ///
    /// The directory is not created on demand: a missing or non-directory path
    /// is a configuration mistake and is reported as such.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let cache_dir = cache_dir.into();
        if !cache_dir.is_dir() {
            return Err(ConfigError::InvalidCacheDir(cache_dir));
        }
        Ok(Self { cache_dir })
    }

    /// Creates a FileCache in the system temporary directory
    pub fn in_temp_dir() -> Result<Self, ConfigError> {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.txt", key))
    }

    /// Reads the cached body for `key`
    ///
    /// A missing file is a plain miss; any other read error is logged and also
    /// reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let path = self.cache_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read cache file");
                None
            }
        }
    }

    /// Writes `body` as the entire content of the file for `key`
    pub fn set(&self, key: &CacheKey, body: &str) -> Result<(), CacheError> {
        let path = self.cache_path(key);
        fs::write(&path, body).map_err(|source| CacheError::Io { path, source })
    }
}
