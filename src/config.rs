//! Client and cache configuration
//!
//! The cache section can be built in code, deserialized from TOML, or filled
//! in from command-line flags. Everything here is validated when the client is
//! constructed; a bad directory or a missing token never surfaces mid-request.

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default Diffbot API endpoint base
pub const DEFAULT_ENDPOINT: &str = "http://www.diffbot.com/api/";

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV_VAR: &str = "DIFFBOT_TOKEN";

/// Default number of attempts per request
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default time-to-live for distributed cache entries (4 days)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 24 * 4;

/// Errors raised while building a client from configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem cache directory does not exist or is not a directory
    #[error("Not a valid cache folder: {}", .0.display())]
    InvalidCacheDir(PathBuf),

    /// Distributed cache selected without connection info
    #[error("Distributed cache selected but no cache server configured")]
    MissingCacheServer,

    /// Cache server connection string could not be parsed
    #[error("Invalid cache server '{server}': {reason}")]
    InvalidCacheServer { server: String, reason: String },

    /// No developer token in config or environment
    #[error("Please provide a developer token (or set DIFFBOT_TOKEN)")]
    MissingToken,

    /// Endpoint base is not a usable URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Config file could not be read
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client could not be built (TLS backend, invalid header)
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which cache backend to use
///
/// The same names are accepted in TOML and on the command line; the CLI also
/// takes the one-letter forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheHandler {
    /// No caching at all
    #[serde(alias = "none")]
    #[value(aliases = ["none", "n"])]
    Disabled,
    /// One file per response in a local directory
    #[value(alias = "f")]
    File,
    /// External key-value cache service
    #[serde(alias = "memcache")]
    #[value(aliases = ["memcache", "m"])]
    Distributed,
}

/// Cache backend selection and settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Explicit backend; see `CacheStore::from_options` for the fallback order
    pub handler: Option<CacheHandler>,
    /// Root directory for the file backend (system temp dir when unset)
    #[serde(alias = "cache_folder")]
    pub cache_dir: Option<PathBuf>,
    /// Connection string for the distributed backend, e.g. `redis://127.0.0.1/`
    #[serde(alias = "memcache_server")]
    pub cache_server: Option<String>,
    /// Time-to-live applied by the distributed backend
    pub ttl_secs: Option<u64>,
}

impl CacheOptions {
    /// Parses cache options from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads cache options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Effective distributed cache TTL
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }
}

/// Full client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Developer token; falls back to `DIFFBOT_TOKEN`
    pub token: Option<String>,
    /// API endpoint base, must end with `/`
    pub endpoint: String,
    /// Total attempts per request
    pub attempts: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Cache backend settings
    pub cache: CacheOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            attempts: DEFAULT_ATTEMPTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache: CacheOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Resolves the developer token from config, then the environment
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        let non_blank = |t: &String| !t.trim().is_empty();
        self.token
            .clone()
            .filter(non_blank)
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok().filter(non_blank))
            .ok_or(ConfigError::MissingToken)
    }
}
