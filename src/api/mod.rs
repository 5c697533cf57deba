//! Diffbot API client
//!
//! Wraps the three Diffbot endpoints the library supports on top of a
//! [`CachedFetcher`]. The article endpoint is decoded from JSON; the follow
//! endpoints answer in XML and are returned as raw text.

mod article;

pub use article::{Article, ArticleOptions};

use reqwest::Url;
use thiserror::Error;

use crate::cache::CacheStore;
use crate::config::{ClientConfig, ConfigError};
use crate::fetch::{CachedFetcher, FetchClient, FetchError, HttpTransport, Params, Transport};

/// Errors returned by API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself failed
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),

    /// The response body was not the expected JSON
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Diffbot article and follow APIs
#[derive(Debug)]
pub struct DiffbotClient<T = HttpTransport> {
    token: String,
    endpoint: Url,
    fetcher: CachedFetcher<T>,
}

impl DiffbotClient<HttpTransport> {
    /// Builds a client from configuration
    ///
    /// Fails when no token is available, the endpoint is not a URL, or the
    /// cache backend cannot be set up.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> DiffbotClient<T> {
    /// Builds a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        let token = config.resolve_token()?;
        let endpoint = parse_endpoint(&config.endpoint)?;
        let cache = CacheStore::from_options(&config.cache)?;
        let client = FetchClient::new(transport).with_attempts(config.attempts);
        Ok(Self {
            token,
            endpoint,
            fetcher: CachedFetcher::new(cache, client),
        })
    }

    pub fn fetcher(&self) -> &CachedFetcher<T> {
        &self.fetcher
    }

    /// Full URL of an API path below the endpoint base
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn token_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("token".to_string(), self.token.clone());
        params
    }

    /// Extracts the article at `url`
    pub async fn article(&self, url: &str, options: &ArticleOptions) -> Result<Article, ApiError> {
        let mut params = self.token_params();
        params.insert("url".to_string(), url.to_string());
        options.apply(&mut params);

        let body = self.fetcher.get(&self.api_url("article"), &params).await?;
        let article = Article::from_response(&body, options.keep_raw_response)?;
        tracing::info!(url, title = article.title.as_deref().unwrap_or(""), "article extracted");
        Ok(article)
    }

    /// Starts following changes on the page at `url`
    ///
    /// Returns the raw XML answer, which carries the follow id.
    pub async fn follow_add(&self, url: &str) -> Result<String, ApiError> {
        let mut params = self.token_params();
        params.insert("url".to_string(), url.to_string());

        Ok(self.fetcher.post(&self.api_url("add"), &params).await?)
    }

    /// Reads the change archive of a followed page
    pub async fn follow_read(&self, follow_id: &str) -> Result<String, ApiError> {
        let mut params = Params::new();
        params.insert("id".to_string(), follow_id.to_string());

        Ok(self
            .fetcher
            .get(&self.api_url("dfs/dml/archive"), &params)
            .await?)
    }
}

/// Parses the endpoint base, making sure relative paths join below it
fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let normalized = if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{}/", endpoint)
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(endpoint.to_string()));
    }
    Ok(url)
}
