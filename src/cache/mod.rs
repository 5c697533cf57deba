//! Response cache keyed by request fingerprint
//!
//! A [`CacheStore`] is one of three backends: disabled, filesystem, or a
//! distributed key-value service. Caching is purely an optimisation: reads
//! that fail are misses, and writes that fail are logged by the caller and
//! otherwise ignored.

mod distributed;
mod file;
mod key;
mod store;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use distributed::RedisCache;
pub use file::FileCache;
pub use key::CacheKey;
pub use store::CacheStore;

/// Errors from writing to a cache backend
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache file could not be written
    #[error("could not write cache file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Distributed cache service failed or was unreachable
    #[error("distributed cache error: {0}")]
    Distributed(#[from] redis::RedisError),

    /// Distributed cache service did not answer in time
    #[error("distributed cache timed out after {0:?}")]
    Timeout(Duration),
}
