//! Command-line interface parsing for the diffbot binary
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`StartupConfig`]: target URL, client configuration, log level
//! and output format.

use clap::{Parser, ValueEnum};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

use crate::api::Article;
use crate::config::{CacheHandler, CacheOptions, ClientConfig, ConfigError};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The positional argument is not an absolute URL with a host
    #[error("Please enter a valid url ({0})")]
    InvalidUrl(String),

    /// Configuration file or values are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How the extracted article is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The response body exactly as received
    Raw,
    /// Compact JSON
    Json,
    /// Indented JSON
    #[default]
    Pretty,
}

/// Diffbot CLI - extract the main article from a web page
#[derive(Parser, Debug)]
#[command(name = "diffbot")]
#[command(about = "Extract articles from web pages with the Diffbot API")]
#[command(version)]
pub struct Cli {
    /// Page to extract
    pub url: String,

    /// Debug logging
    #[arg(short, long, conflicts_with_all = ["verbose", "quiet"])]
    pub debug: bool,

    /// Informational logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Cache backend: file, memcache, none (short forms f, m, n)
    #[arg(short, long, value_name = "CACHE", value_enum, ignore_case = true)]
    pub cache: Option<CacheHandler>,

    /// Directory for the file cache (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Distributed cache server, e.g. redis://127.0.0.1/
    #[arg(long, value_name = "URL")]
    pub cache_server: Option<String>,

    /// TOML file with cache settings; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Diffbot developer token (defaults to $DIFFBOT_TOKEN)
    #[arg(short = 'k', long = "key", value_name = "TOKEN")]
    pub key: Option<String>,

    /// Request attempts before giving up on timeouts
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,

    /// Per-attempt timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// API endpoint base
    #[arg(long, value_name = "URL", hide = true)]
    pub endpoint: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Validated page URL
    pub url: String,
    /// Client settings
    pub client: ClientConfig,
    /// Log level when `RUST_LOG` is unset
    pub log_level: Level,
    /// How to print the result
    pub output: OutputFormat,
}

/// Checks that `s` is an absolute URL with a scheme and a host
pub fn parse_url_arg(s: &str) -> Result<String, CliError> {
    let url = Url::parse(s).map_err(|_| CliError::InvalidUrl(s.to_string()))?;
    if url.host_str().is_none() {
        return Err(CliError::InvalidUrl(s.to_string()));
    }
    Ok(url.to_string())
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Cache settings start from `--config` when given; individual flags
    /// override the file.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let url = parse_url_arg(&cli.url)?;

        let mut cache = match &cli.config {
            Some(path) => CacheOptions::from_file(path)?,
            None => CacheOptions::default(),
        };
        if let Some(handler) = cli.cache {
            cache.handler = Some(handler);
        }
        if let Some(dir) = &cli.cache_dir {
            cache.cache_dir = Some(dir.clone());
        }
        if let Some(server) = &cli.cache_server {
            cache.cache_server = Some(server.clone());
        }

        let mut client = ClientConfig {
            token: cli.key.clone(),
            cache,
            ..Default::default()
        };
        if let Some(attempts) = cli.attempts {
            client.attempts = attempts;
        }
        if let Some(secs) = cli.timeout {
            client.timeout = Duration::from_secs(secs);
        }
        if let Some(endpoint) = &cli.endpoint {
            client.endpoint = endpoint.clone();
        }

        let log_level = if cli.debug {
            Level::DEBUG
        } else if cli.verbose {
            Level::INFO
        } else if cli.quiet {
            Level::ERROR
        } else {
            Level::WARN
        };

        Ok(StartupConfig {
            url,
            client,
            log_level,
            output: cli.output,
        })
    }
}

/// Renders an article for printing
///
/// `Raw` needs the article to have been fetched with the raw response kept.
pub fn render_article(
    article: &Article,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Raw => Ok(article.raw_response.clone()),
        OutputFormat::Json => serde_json::to_string(article),
        OutputFormat::Pretty => serde_json::to_string_pretty(article),
    }
}
