//! Request fingerprints used as cache keys

use sha2::{Digest, Sha256};
use std::fmt;

use crate::fetch::Params;

/// Deterministic digest of a request's URL and parameters
///
/// Rendered as 64 lowercase hex characters, which makes it safe to use
/// directly as a file name or a cache-service key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Fingerprints `url` plus every parameter pair, in the map's sorted order
    pub fn new(url: &str, params: &Params) -> Self {
        let mut h = Sha256::new();
        h.update(url.as_bytes());
        h.update(b"?");
        for (name, value) in params {
            h.update(name.as_bytes());
            h.update(b"\0");
            h.update(value.as_bytes());
            h.update(b"\n");
        }
        Self(format!("{:x}", h.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
