//! HTTP fetcher implementation
//!
//! This module defines the [`Downloader`] seam the crawler fetches pages
//! through, and [`HttpDownloader`], its `reqwest` based implementation:
//! - Building HTTP clients with proper user agent strings
//! - Bounded redirect following
//! - Error classification into [`PageError::Download`]

use crate::config::{HttpConfig, UserAgentConfig};
use crate::crawler::parser::{Document, HtmlDocument};
use crate::state::PageError;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Fetches pages for the crawler
///
/// `download` may take arbitrarily long; the crawler bounds how many calls
/// run at once, both globally and per host.
pub trait Downloader: Send + Sync + 'static {
    /// Page handle produced by a successful download
    type Document: Document;

    /// Downloads `url`
    fn download(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Document, PageError>> + Send;
}

/// Formats the user agent string
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use depthcrawl::config::{HttpConfig, UserAgentConfig};
/// use depthcrawl::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "DepthCrawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .redirect(Policy::limited(http.max_redirects))
        .https_only(http.https_only)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Error message |
/// |-----------|---------------|
/// | Timeout | `request timeout` |
/// | Connection refused / DNS / TLS | `connection refused: ...` |
/// | Redirect limit or loop | `redirect error: ...` |
/// | Non-2xx status | `HTTP <code>` |
/// | Body read failure | underlying error |
pub async fn fetch_page(client: &Client, url: &str) -> Result<HtmlDocument, PageError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(PageError::Download(format!("HTTP {}", status.as_u16())));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.text().await.map_err(classify_error)?;

    if final_url != url {
        tracing::debug!("{} redirected to {}", url, final_url);
    }

    Ok(HtmlDocument {
        url: final_url,
        content_type,
        body,
    })
}

fn classify_error(e: reqwest::Error) -> PageError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection refused: {}", e)
    } else if e.is_redirect() {
        format!("redirect error: {}", e)
    } else {
        e.to_string()
    };
    PageError::Download(message)
}

/// [`Downloader`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Builds a downloader from configuration
    pub fn new(user_agent: &UserAgentConfig, http: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(user_agent, http)?))
    }

    /// Wraps an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    type Document = HtmlDocument;

    async fn download(&self, url: &str) -> Result<HtmlDocument, PageError> {
        fetch_page(&self.client, url).await
    }
}
