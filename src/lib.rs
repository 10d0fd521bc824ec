//! DepthCrawl: a depth-bounded, host-throttled concurrent web crawler
//!
//! This crate starts from a seed URL, downloads pages through a pluggable
//! [`Downloader`], extracts their links and keeps scheduling unvisited links
//! until the maximum depth is reached. Global download concurrency, extraction
//! concurrency and per-host download concurrency are bounded independently.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Per-page failures never surface here; they are collected in
/// [`CrawlResult::errors`] as [`PageError`] values.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Crawler is closed")]
    Closed,

    #[error("Internal consistency failure: {0}")]
    Internal(#[from] state::StateError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL '{0}' has no host")]
    MissingHost(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    crawl, CrawlResult, Document, Downloader, ErrorKind, HtmlDocument, HttpDownloader, PageError,
    WebCrawler,
};
pub use crate::url::get_host;
