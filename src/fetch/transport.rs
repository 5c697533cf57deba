//! Single-attempt HTTP transport
//!
//! A [`Transport`] performs exactly one network exchange and classifies what
//! went wrong. Retrying and caching happen above it, which keeps this layer
//! trivially replaceable in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Request parameters, kept sorted so serialization is deterministic
pub type Params = BTreeMap<String, String>;

/// User agent sent with every request
const USER_AGENT: &str = concat!("diffbot-rs/", env!("CARGO_PKG_VERSION"));

/// HTTP method of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One request against the remote endpoint
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub params: &'a Params,
}

/// Raw outcome of one successful exchange, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Why a single attempt produced no response
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Attempt exceeded its deadline
    #[error("request timed out")]
    Timeout,

    /// Remote host could not be reached
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// Request could not be built (bad URL, bad parameters)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else, including an unreadable response body
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Unreachable(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Unreachable(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Performs a single request attempt
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &FetchRequest<'_>) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport with a fixed per-attempt timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose every attempt is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        Self::from_builder(Client::builder().timeout(timeout).user_agent(USER_AGENT))
    }

    /// Builds the HTTP client; a client that cannot be built is a config error
    pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, ConfigError> {
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &FetchRequest<'_>) -> Result<TransportResponse, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(request.url).query(request.params),
            Method::Post => self.client.post(request.url).form(request.params),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
