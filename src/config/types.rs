use serde::Deserialize;

/// Main configuration structure for DepthCrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl, the seed itself is depth 1
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent download workers
    pub downloaders: usize,

    /// Number of concurrent link extraction workers
    pub extractors: usize,

    /// Maximum number of concurrent downloads against a single host
    #[serde(rename = "per-host")]
    pub per_host: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// HTTP client tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed for a single download
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Refuse plain-HTTP URLs
    #[serde(rename = "https-only")]
    pub https_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            https_only: false,
        }
    }
}
