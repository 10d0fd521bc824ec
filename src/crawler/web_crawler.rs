//! Public crawl entry point
//!
//! A [`WebCrawler`] owns the two long-lived worker pools and builds a fresh
//! [`Coordinator`] and host throttle for every crawl, so independent crawls
//! share workers but never state.

use crate::config::MAX_WORKERS;
use crate::crawler::coordinator::Coordinator;
use crate::crawler::fetcher::Downloader;
use crate::crawler::pool::WorkerPool;
use crate::state::{CrawlResult, StateError};
use crate::CrawlerError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{oneshot, watch};

/// Concurrent, depth-bounded, host-throttled crawler
///
/// # Example
///
/// ```no_run
/// use depthcrawl::config::{HttpConfig, UserAgentConfig};
/// use depthcrawl::{HttpDownloader, WebCrawler};
///
/// # async fn example(user_agent: UserAgentConfig) -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = HttpDownloader::new(&user_agent, &HttpConfig::default())?;
/// let crawler = WebCrawler::new(downloader, 8, 4, 2)?;
///
/// let result = crawler.crawl("https://example.com/", 2).await?;
/// println!("{} pages, {} errors", result.downloaded.len(), result.errors.len());
///
/// crawler.close();
/// # Ok(())
/// # }
/// ```
pub struct WebCrawler<D: Downloader> {
    downloader: Arc<D>,
    per_host: usize,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    closed: watch::Sender<bool>,
}

impl<D: Downloader> WebCrawler<D> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `downloader` - Fetches pages
    /// * `downloaders` - Maximum concurrent downloads overall
    /// * `extractors` - Maximum concurrent link extractions
    /// * `per_host` - Maximum concurrent downloads against one host
    ///
    /// # Returns
    ///
    /// * `Ok(WebCrawler)` - Ready to crawl
    /// * `Err(CrawlerError::InvalidArgument)` - A size is zero or above the limit
    pub fn new(
        downloader: D,
        downloaders: usize,
        extractors: usize,
        per_host: usize,
    ) -> Result<Self, CrawlerError> {
        check_size("downloaders", downloaders)?;
        check_size("extractors", extractors)?;
        check_size("per_host", per_host)?;

        let (closed, _) = watch::channel(false);

        Ok(Self {
            downloader: Arc::new(downloader),
            per_host,
            download_pool: Arc::new(WorkerPool::new("download", downloaders)),
            extract_pool: Arc::new(WorkerPool::new("extract", extractors)),
            closed,
        })
    }

    /// Crawls from `seed` down to `max_depth` (the seed is depth 1)
    ///
    /// Waits until every scheduled download and extraction has resolved.
    /// Per-page failures are reported in the result, not as an `Err`.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Downloaded pages and per-URL errors
    /// * `Err(CrawlerError::InvalidArgument)` - `max_depth` is zero
    /// * `Err(CrawlerError::Closed)` - The crawler was closed before or during the crawl
    /// * `Err(CrawlerError::Internal)` - The completion protocol was violated
    pub async fn crawl(&self, seed: &str, max_depth: u32) -> Result<CrawlResult, CrawlerError> {
        if max_depth < 1 {
            return Err(CrawlerError::InvalidArgument(format!(
                "max_depth must be >= 1, got {}",
                max_depth
            )));
        }

        // Subscribe before scheduling anything so a concurrent close is seen
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(CrawlerError::Closed);
        }

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} downloaders, {} extractors, {} per host)",
            seed,
            max_depth,
            self.download_pool.size(),
            self.extract_pool.size(),
            self.per_host
        );
        let start_time = Instant::now();

        let (coordinator, done) = Coordinator::new(
            Arc::clone(&self.downloader),
            Arc::clone(&self.download_pool),
            Arc::clone(&self.extract_pool),
            self.per_host,
            max_depth,
        );
        coordinator.start(seed);

        tokio::select! {
            outcome = done => completion_outcome(outcome)?,
            _ = closed.wait_for(|closed| *closed) => {
                tracing::warn!("Crawl of {} interrupted by close", seed);
                coordinator.shutdown();
                return Err(CrawlerError::Closed);
            }
        }

        let result = coordinator.take_result();
        tracing::info!(
            "Crawl of {} completed: {} downloaded, {} errors, {} hosts in {:?}",
            seed,
            result.downloaded.len(),
            result.errors.len(),
            coordinator.hosts_seen(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Shuts down both worker pools; idempotent
    ///
    /// A crawl still in progress returns [`CrawlerError::Closed`].
    pub fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }

        tracing::debug!("Closing crawler");
        self.download_pool.close();
        self.extract_pool.close();
    }

    /// Returns whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Configured download concurrency
    pub fn downloaders(&self) -> usize {
        self.download_pool.size()
    }

    /// Configured extraction concurrency
    pub fn extractors(&self) -> usize {
        self.extract_pool.size()
    }

    /// Configured per-host download concurrency
    pub fn per_host(&self) -> usize {
        self.per_host
    }
}

impl<D: Downloader> Drop for WebCrawler<D> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Maps the completion signal onto the crawl's outcome
///
/// A dropped sender means the crawl can never settle, which is treated like
/// any other protocol violation.
fn completion_outcome(
    outcome: Result<Result<(), StateError>, oneshot::error::RecvError>,
) -> Result<(), CrawlerError> {
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StateError::CompletionLost.into()),
    }
}

fn check_size(name: &str, value: usize) -> Result<(), CrawlerError> {
    if !(1..=MAX_WORKERS).contains(&value) {
        return Err(CrawlerError::InvalidArgument(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_WORKERS, value
        )));
    }
    Ok(())
}
