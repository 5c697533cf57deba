//! Retrying fetch client
//!
//! Transient failures (timeouts, unreachable host) are retried immediately up
//! to the attempt ceiling. Anything else fails on the spot, and so does any
//! non-2xx status.

use std::time::Duration;
use thiserror::Error;

use super::transport::{FetchRequest, HttpTransport, Method, Params, Transport, TransportError};
use crate::config::{ConfigError, DEFAULT_ATTEMPTS};

/// Uniform failure of a fetch, returned instead of a body
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Every attempt failed with a transient error
    #[error("request failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: TransportError },

    /// Server answered with a non-success status
    #[error("server returned HTTP status {0}")]
    Status(u16),

    /// Request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Non-retryable transport failure
    #[error("{0}")]
    Transport(TransportError),
}

impl FetchError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Performs requests with a bounded retry policy
#[derive(Debug, Clone)]
pub struct FetchClient<T = HttpTransport> {
    transport: T,
    max_attempts: u32,
}

impl FetchClient<HttpTransport> {
    /// reqwest transport with the given per-attempt timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self::new(HttpTransport::new(timeout)?))
    }
}

impl<T: Transport> FetchClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Sets the total number of attempts; zero is treated as one
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET with `params` in the query string
    pub async fn get(&self, url: &str, params: &Params) -> Result<String, FetchError> {
        self.fetch(Method::Get, url, params).await
    }

    /// POST with `params` as a url-encoded form body
    pub async fn post(&self, url: &str, params: &Params) -> Result<String, FetchError> {
        self.fetch(Method::Post, url, params).await
    }

    /// Runs the request, retrying transient failures
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        params: &Params,
    ) -> Result<String, FetchError> {
        let request = FetchRequest { method, url, params };
        let mut attempt = 1;

        loop {
            match self.transport.send(&request).await {
                Ok(response) if (200..300).contains(&response.status) => {
                    tracing::debug!(method = method.as_str(), url, attempt, "fetch succeeded");
                    return Ok(response.body);
                }
                Ok(response) => {
                    tracing::error!(
                        method = method.as_str(),
                        url,
                        status = response.status,
                        "http request returned non-success status"
                    );
                    return Err(FetchError::Status(response.status));
                }
                Err(e) if e.is_transient() => {
                    tracing::info!(
                        method = method.as_str(),
                        url,
                        "download attempt [{}/{}] failed: {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    if attempt >= self.max_attempts {
                        tracing::error!(
                            url,
                            attempts = attempt,
                            "exceeded number of attempts allowed"
                        );
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    attempt += 1;
                }
                Err(TransportError::InvalidRequest(msg)) => {
                    tracing::error!(method = method.as_str(), url, error = %msg, "invalid request");
                    return Err(FetchError::InvalidRequest(msg));
                }
                Err(e) => {
                    tracing::error!(method = method.as_str(), url, error = %e, "request failed");
                    return Err(FetchError::Transport(e));
                }
            }
        }
    }
}
