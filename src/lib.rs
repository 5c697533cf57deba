//! Diffbot API client library
//!
//! Article extraction and page following on top of a retrying HTTP fetch
//! layer with pluggable response caching (disabled, filesystem, or a
//! distributed key-value service).

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;

pub use api::{ApiError, Article, ArticleOptions, DiffbotClient};
pub use cache::{CacheKey, CacheStore};
pub use config::{CacheHandler, CacheOptions, ClientConfig, ConfigError};
pub use fetch::{CachedFetcher, FetchClient, FetchError, Params};
