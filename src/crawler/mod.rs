//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Per-host download admission (`throttle`)
//! - Fixed-size download and extraction worker pools (`pool`)
//! - Crawl state ownership and the completion protocol (`coordinator`)
//! - The public entry point (`web_crawler`)
//! - HTTP fetching and HTML link extraction adapters (`fetcher`, `parser`)

mod coordinator;
mod fetcher;
mod parser;
mod pool;
mod throttle;
mod web_crawler;

pub use coordinator::{Completion, Coordinator};
pub use fetcher::{build_http_client, fetch_page, format_user_agent, Downloader, HttpDownloader};
pub use parser::{parse_html, Document, HtmlDocument, ParsedPage};
pub use pool::{PoolClosed, WorkerPool};
pub use throttle::{HostPermit, HostThrottle, ThrottleClosed};
pub use web_crawler::WebCrawler;

pub use crate::state::{CrawlResult, ErrorKind, PageError};

use crate::config::Config;
use crate::CrawlerError;

/// Runs a single crawl with a throwaway crawler
///
/// Builds a [`WebCrawler`], crawls from `seed` and closes the crawler again.
///
/// # Arguments
///
/// * `downloader` - Fetches pages
/// * `seed` - Starting URL, depth 1
/// * `max_depth` - Deepest level to download
/// * `downloaders` - Maximum concurrent downloads overall
/// * `extractors` - Maximum concurrent link extractions
/// * `per_host` - Maximum concurrent downloads against one host
pub async fn crawl<D: Downloader>(
    downloader: D,
    seed: &str,
    max_depth: u32,
    downloaders: usize,
    extractors: usize,
    per_host: usize,
) -> Result<CrawlResult, CrawlerError> {
    let crawler = WebCrawler::new(downloader, downloaders, extractors, per_host)?;
    let result = crawler.crawl(seed, max_depth).await;
    crawler.close();
    result
}

/// Runs a complete HTTP crawl described by a configuration
///
/// # Example
///
/// ```no_run
/// use depthcrawl::config::load_config;
/// use depthcrawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let result = run_crawl(&config, "https://example.com/").await?;
/// println!("Downloaded {} pages", result.downloaded.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, seed: &str) -> Result<CrawlResult, CrawlerError> {
    let downloader = HttpDownloader::new(&config.user_agent, &config.http)?;
    crawl(
        downloader,
        seed,
        config.crawler.max_depth,
        config.crawler.downloaders,
        config.crawler.extractors,
        config.crawler.per_host,
    )
    .await
}
