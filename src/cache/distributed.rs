//! Distributed cache backend backed by a Redis-compatible key-value service
//!
//! The connection is opened lazily on first use and then shared; the
//! multiplexed connection is cheap to clone per call. Expiry is left entirely
//! to the service through `SETEX`. Every round trip, connecting included, is
//! bounded by an operation timeout so a silent server degrades to a miss.

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{CacheError, CacheKey};
use crate::config::ConfigError;

/// Prefix applied to every key stored in the shared service
const KEY_PREFIX: &str = "diffbot:";

/// Upper bound on one cache operation, connection setup included
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Cache store delegating to an external key-value service
pub struct RedisCache {
    client: redis::Client,
    server: String,
    ttl: Duration,
    op_timeout: Duration,
    connection: OnceCell<MultiplexedConnection>,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("server", &self.server)
            .field("ttl", &self.ttl)
            .field("op_timeout", &self.op_timeout)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Validates the server URL; does not connect
    pub fn new(server: &str, ttl: Duration) -> Result<Self, ConfigError> {
        let client = redis::Client::open(server).map_err(|e| ConfigError::InvalidCacheServer {
            server: server.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            server: server.to_string(),
            ttl,
            op_timeout: DEFAULT_OP_TIMEOUT,
            connection: OnceCell::new(),
        })
    }

    /// Overrides the per-operation timeout
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    fn storage_key(key: &CacheKey) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let conn = self
            .connection
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }

    /// Looks up `key`; unreachable, silent or failing service is a miss
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let lookup = async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(Self::storage_key(key)).await?;
            Ok::<_, CacheError>(value)
        };

        match self.bounded(lookup).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(server = %self.server, error = %e, "distributed cache read failed");
                None
            }
        }
    }

    /// Stores `body` under `key` with the configured TTL
    pub async fn set(&self, key: &CacheKey, body: &str) -> Result<(), CacheError> {
        // SETEX rejects a zero expiry
        let ttl_secs = self.ttl.as_secs().max(1);
        let store = async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(Self::storage_key(key), body, ttl_secs)
                .await?;
            Ok::<_, CacheError>(())
        };

        self.bounded(store).await
    }

    /// Runs one cache operation under the operation timeout
    async fn bounded<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: std::future::Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Params;

    #[test]
    fn test_new_accepts_redis_url_without_connecting() {
        // Nothing listens on this port; construction must still succeed.
        let cache = RedisCache::new("redis://127.0.0.1:1/", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.server(), "redis://127.0.0.1:1/");
        assert_eq!(cache.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_op_timeout() {
        let cache = RedisCache::new("redis://127.0.0.1:1/", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.op_timeout(), DEFAULT_OP_TIMEOUT);
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let result = RedisCache::new("not a url", Duration::from_secs(60));
        assert!(matches!(result, Err(ConfigError::InvalidCacheServer { .. })));
    }

    #[test]
    fn test_storage_key_is_prefixed() {
        let key = CacheKey::new("http://example.test/", &Params::new());
        assert_eq!(RedisCache::storage_key(&key), format!("diffbot:{}", key));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_miss() {
        let cache = RedisCache::new("redis://127.0.0.1:1/", Duration::from_secs(60)).unwrap();
        let key = CacheKey::new("http://example.test/", &Params::new());

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_set_reports_failure() {
        let cache = RedisCache::new("redis://127.0.0.1:1/", Duration::from_secs(60)).unwrap();
        let key = CacheKey::new("http://example.test/", &Params::new());

        assert!(matches!(
            cache.set(&key, "body").await,
            Err(CacheError::Distributed(_))
        ));
    }

    /// Binds a listener that accepts connections and never answers
    async fn silent_server() -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (format!("redis://{}/", addr), handle)
    }

    #[tokio::test]
    async fn test_silent_server_get_is_a_miss() {
        let (server, handle) = silent_server().await;
        let cache = RedisCache::new(&server, Duration::from_secs(60))
            .unwrap()
            .with_op_timeout(Duration::from_millis(200));
        let key = CacheKey::new("http://example.test/", &Params::new());

        let result = tokio::time::timeout(Duration::from_secs(10), cache.get(&key)).await;

        assert!(result.is_ok(), "get should give up within the operation timeout");
        assert!(result.unwrap().is_none());
        handle.abort();
    }

    #[tokio::test]
    async fn test_silent_server_set_times_out() {
        let (server, handle) = silent_server().await;
        let cache = RedisCache::new(&server, Duration::from_secs(60))
            .unwrap()
            .with_op_timeout(Duration::from_millis(200));
        let key = CacheKey::new("http://example.test/", &Params::new());

        let result = tokio::time::timeout(Duration::from_secs(10), cache.set(&key, "body")).await;

        assert!(result.is_ok(), "set should give up within the operation timeout");
        assert!(matches!(result.unwrap(), Err(CacheError::Timeout(_))));
        handle.abort();
    }
}
