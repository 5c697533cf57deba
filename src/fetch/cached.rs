//! Cache-aware fetching
//!
//! [`CachedFetcher`] composes a [`CacheStore`] with a [`FetchClient`]: look up
//! the request fingerprint, return a hit, otherwise fetch and store the body.
//! Only successful bodies are stored; a failed store never changes the result.

use super::client::{FetchClient, FetchError};
use super::transport::{HttpTransport, Method, Params, Transport};
use crate::cache::{CacheKey, CacheStore};

/// Fetch client whose successful responses are served from and stored in a cache
#[derive(Debug)]
pub struct CachedFetcher<T = HttpTransport> {
    cache: CacheStore,
    client: FetchClient<T>,
}

impl<T: Transport> CachedFetcher<T> {
    pub fn new(cache: CacheStore, client: FetchClient<T>) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn client(&self) -> &FetchClient<T> {
        &self.client
    }

    pub async fn get(&self, url: &str, params: &Params) -> Result<String, FetchError> {
        self.fetch(Method::Get, url, params).await
    }

    pub async fn post(&self, url: &str, params: &Params) -> Result<String, FetchError> {
        self.fetch(Method::Post, url, params).await
    }

    async fn fetch(
        &self,
        method: Method,
        url: &str,
        params: &Params,
    ) -> Result<String, FetchError> {
        if !self.cache.is_enabled() {
            return self.client.fetch(method, url, params).await;
        }

        let key = CacheKey::new(url, params);
        if let Some(body) = self.cache.get(&key).await {
            tracing::debug!(%key, url, "cache hit");
            return Ok(body);
        }
        tracing::debug!(%key, url, "cache miss");

        let body = self.client.fetch(method, url, params).await?;
        if let Err(e) = self.cache.set(&key, &body).await {
            tracing::warn!(
                %key,
                backend = self.cache.kind(),
                error = %e,
                "failed to store response in cache"
            );
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCache;
    use crate::fetch::testing::ScriptedTransport;
    use crate::fetch::TransportError;
    use std::fs;
    use tempfile::TempDir;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn file_fetcher(
        script: Vec<Result<crate::fetch::TransportResponse, TransportError>>,
    ) -> (CachedFetcher<ScriptedTransport>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheStore::Filesystem(FileCache::new(temp_dir.path()).unwrap());
        let fetcher = CachedFetcher::new(cache, FetchClient::new(ScriptedTransport::new(script)));
        (fetcher, temp_dir)
    }

    #[tokio::test]
    async fn test_disabled_cache_passes_through() {
        let fetcher = CachedFetcher::new(
            CacheStore::Disabled,
            FetchClient::new(ScriptedTransport::new(vec![ScriptedTransport::ok(
                r#"{"title":"X"}"#,
            )])),
        );
        let p = params(&[("token", "T"), ("url", "http://site/page")]);

        let body = fetcher.get("http://example.test/article", &p).await.unwrap();

        assert_eq!(body, r#"{"title":"X"}"#);
        assert_eq!(fetcher.client().transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_hits_network() {
        let fetcher = CachedFetcher::new(
            CacheStore::Disabled,
            FetchClient::new(ScriptedTransport::new(vec![
                ScriptedTransport::ok("first"),
                ScriptedTransport::ok("second"),
            ])),
        );
        let p = params(&[("url", "u")]);

        assert_eq!(fetcher.get("http://example.test/a", &p).await.unwrap(), "first");
        assert_eq!(fetcher.get("http://example.test/a", &p).await.unwrap(), "second");
        assert_eq!(fetcher.client().transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let (fetcher, _temp_dir) = file_fetcher(vec![
            ScriptedTransport::ok("fresh body"),
            ScriptedTransport::ok("should not be fetched"),
        ]);
        let p = params(&[("token", "T"), ("url", "http://site/page")]);

        let first = fetcher.get("http://example.test/article", &p).await.unwrap();
        let second = fetcher.get("http://example.test/article", &p).await.unwrap();

        assert_eq!(first, "fresh body");
        assert_eq!(second, "fresh body");
        assert_eq!(fetcher.client().transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_different_params_are_cached_separately() {
        let (fetcher, _temp_dir) = file_fetcher(vec![
            ScriptedTransport::ok("page a"),
            ScriptedTransport::ok("page b"),
        ]);

        let a = fetcher
            .get("http://example.test/article", &params(&[("url", "a")]))
            .await
            .unwrap();
        let b = fetcher
            .get("http://example.test/article", &params(&[("url", "b")]))
            .await
            .unwrap();

        assert_eq!(a, "page a");
        assert_eq!(b, "page b");
        assert_eq!(fetcher.client().transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (fetcher, temp_dir) = file_fetcher(vec![
            ScriptedTransport::status(500),
            ScriptedTransport::ok("recovered"),
        ]);
        let p = params(&[("url", "u")]);

        let first = fetcher.get("http://example.test/article", &p).await;
        assert!(matches!(first, Err(FetchError::Status(500))));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        let second = fetcher.get("http://example.test/article", &p).await.unwrap();
        assert_eq!(second, "recovered");
        assert_eq!(fetcher.client().transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_prepopulated_entry_bypasses_network() {
        let (fetcher, _temp_dir) = file_fetcher(vec![]);
        let p = params(&[("id", "42")]);
        let key = CacheKey::new("http://example.test/dfs/dml/archive", &p);
        fetcher.cache().set(&key, "<response/>").await.unwrap();

        let body = fetcher.get("http://example.test/dfs/dml/archive", &p).await.unwrap();

        assert_eq!(body, "<response/>");
        assert_eq!(fetcher.client().transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_post_responses_are_cached() {
        let (fetcher, _temp_dir) = file_fetcher(vec![ScriptedTransport::ok("<id>1</id>")]);
        let p = params(&[("token", "T"), ("url", "http://site/page")]);

        fetcher.post("http://example.test/add", &p).await.unwrap();
        let again = fetcher.post("http://example.test/add", &p).await.unwrap();

        assert_eq!(again, "<id>1</id>");
        assert_eq!(fetcher.client().transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_body() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("vanishing");
        fs::create_dir(&dir).unwrap();
        let cache = CacheStore::Filesystem(FileCache::new(&dir).unwrap());
        fs::remove_dir(&dir).unwrap();
        let fetcher = CachedFetcher::new(
            cache,
            FetchClient::new(ScriptedTransport::new(vec![
                ScriptedTransport::ok("body"),
                ScriptedTransport::ok("body again"),
            ])),
        );
        let p = params(&[("url", "u")]);

        assert_eq!(fetcher.get("http://example.test/a", &p).await.unwrap(), "body");
        assert_eq!(fetcher.get("http://example.test/a", &p).await.unwrap(), "body again");
        assert_eq!(fetcher.client().transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_falls_back_to_network() {
        let (fetcher, temp_dir) = file_fetcher(vec![ScriptedTransport::ok("fetched body")]);
        let p = params(&[("url", "u")]);
        let key = CacheKey::new("http://example.test/article", &p);
        // A directory where the entry file belongs makes the read fail
        fs::create_dir(temp_dir.path().join(format!("{}.txt", key))).unwrap();

        let body = fetcher.get("http://example.test/article", &p).await.unwrap();

        assert_eq!(body, "fetched body");
        assert_eq!(fetcher.client().transport().call_count(), 1);
    }
}
