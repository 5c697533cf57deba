//! HTTP fetching with bounded retries and response caching
//!
//! Three layers, bottom-up:
//! - [`Transport`]: one attempt, classifies failures as transient or not
//! - [`FetchClient`]: retry policy and status handling
//! - [`CachedFetcher`]: serves and stores bodies through a [`CacheStore`](crate::cache::CacheStore)

mod cached;
mod client;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use cached::CachedFetcher;
pub use client::{FetchClient, FetchError};
pub use transport::{
    FetchRequest, HttpTransport, Method, Params, Transport, TransportError, TransportResponse,
};
