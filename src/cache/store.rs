//! Backend-independent cache store and its factory

use super::{CacheError, CacheKey, FileCache, RedisCache};
use crate::config::{CacheHandler, CacheOptions, ConfigError};

/// Response cache with a uniform contract over every backend
///
/// `get` never fails: a backend error is a miss. `set` reports failure so the
/// caller can log it, but a failed write never affects the fetched result.
#[derive(Debug)]
pub enum CacheStore {
    /// Caching turned off; every lookup misses and writes are dropped
    Disabled,
    /// One file per key in a local directory
    Filesystem(FileCache),
    /// External key-value service with a fixed TTL
    Distributed(RedisCache),
}

impl CacheStore {
    /// Builds a store from configuration
    ///
    /// Selection order:
    /// 1. An explicit `handler` always wins. `file` uses `cache_dir` or the
    ///    system temp dir; `distributed` requires `cache_server`.
    /// 2. Without a handler, a configured `cache_server` selects the
    ///    distributed backend.
    /// 3. Otherwise caching is disabled.
    pub fn from_options(options: &CacheOptions) -> Result<Self, ConfigError> {
        let store = match options.handler {
            Some(CacheHandler::Disabled) => CacheStore::Disabled,
            Some(CacheHandler::File) => {
                let cache = match &options.cache_dir {
                    Some(dir) => FileCache::new(dir)?,
                    None => FileCache::in_temp_dir()?,
                };
                CacheStore::Filesystem(cache)
            }
            Some(CacheHandler::Distributed) => {
                let server = options
                    .cache_server
                    .as_deref()
                    .ok_or(ConfigError::MissingCacheServer)?;
                CacheStore::Distributed(RedisCache::new(server, options.ttl())?)
            }
            None => match options.cache_server.as_deref() {
                Some(server) => CacheStore::Distributed(RedisCache::new(server, options.ttl())?),
                None => CacheStore::Disabled,
            },
        };
        tracing::debug!(backend = store.kind(), "cache store selected");
        Ok(store)
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, CacheStore::Disabled)
    }

    /// Short backend name for logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            CacheStore::Disabled => "disabled",
            CacheStore::Filesystem(_) => "file",
            CacheStore::Distributed(_) => "distributed",
        }
    }

    /// Looks up a cached body
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        match self {
            CacheStore::Disabled => None,
            CacheStore::Filesystem(cache) => cache.get(key),
            CacheStore::Distributed(cache) => cache.get(key).await,
        }
    }

    /// Stores a body, overwriting any previous entry for `key`
    pub async fn set(&self, key: &CacheKey, body: &str) -> Result<(), CacheError> {
        match self {
            CacheStore::Disabled => Ok(()),
            CacheStore::Filesystem(cache) => cache.set(key, body),
            CacheStore::Distributed(cache) => cache.set(key, body).await,
        }
    }
}
