//! In-memory link graph downloader with concurrency instrumentation

use depthcrawl::{get_host, Document, Downloader, PageError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a page behaves when downloaded
#[derive(Debug, Clone)]
pub enum Page {
    Links(Vec<String>),
    DownloadFails,
    ExtractFails,
    Panics,
}

/// Downloaded page handed to the extractor
pub struct GraphDocument(Result<Vec<String>, PageError>);

impl Document for GraphDocument {
    fn extract_links(&self) -> Result<Vec<String>, PageError> {
        self.0.clone()
    }
}

#[derive(Default)]
struct Inner {
    pages: HashMap<String, Page>,
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
    host_active: Mutex<HashMap<String, usize>>,
    host_peak: Mutex<HashMap<String, usize>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Serves pages from a fixed graph; unknown URLs fail to download
#[derive(Clone, Default)]
pub struct GraphDownloader {
    inner: Arc<Inner>,
}

impl GraphDownloader {
    pub fn new(pages: Vec<(&str, Page)>) -> Self {
        Self::with_delay(pages, Duration::ZERO)
    }

    pub fn with_delay(pages: Vec<(&str, Page)>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                pages: pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
                delay,
                ..Inner::default()
            }),
        }
    }

    /// Number of times each URL was downloaded
    pub fn calls(&self) -> HashMap<String, usize> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Highest number of concurrent downloads observed for a host
    pub fn host_peak(&self, host: &str) -> usize {
        self.inner
            .host_peak
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of concurrent downloads observed overall
    pub fn peak(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }

    fn enter(&self, host: &str) {
        let now = self.inner.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);

        let mut active = self.inner.host_active.lock().unwrap();
        let count = active.entry(host.to_string()).or_insert(0);
        *count += 1;
        let mut peak = self.inner.host_peak.lock().unwrap();
        let best = peak.entry(host.to_string()).or_insert(0);
        *best = (*best).max(*count);
    }

    fn leave(&self, host: &str) {
        self.inner.active.fetch_sub(1, Ordering::SeqCst);
        let mut active = self.inner.host_active.lock().unwrap();
        if let Some(count) = active.get_mut(host) {
            *count -= 1;
        }
    }
}

impl Downloader for GraphDownloader {
    type Document = GraphDocument;

    async fn download(&self, url: &str) -> Result<GraphDocument, PageError> {
        *self
            .inner
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let host = get_host(url).expect("crawler only downloads URLs with a host");
        self.enter(&host);
        if !self.inner.delay.is_zero() {
            tokio::time::sleep(self.inner.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.leave(&host);

        match self.inner.pages.get(url) {
            Some(Page::Panics) => panic!("downloader crashed on {}", url),
            Some(Page::Links(links)) => Ok(GraphDocument(Ok(links.clone()))),
            Some(Page::ExtractFails) => Ok(GraphDocument(Err(PageError::Extract(
                "unparseable page".to_string(),
            )))),
            Some(Page::DownloadFails) | None => {
                Err(PageError::Download(format!("HTTP 404 for {}", url)))
            }
        }
    }
}

/// Shorthand for a page linking to `links`
pub fn links(links: &[&str]) -> Page {
    Page::Links(links.iter().map(|s| s.to_string()).collect())
}

/// Sorted copy of a URL list
pub fn sorted(urls: &[String]) -> Vec<String> {
    let mut urls = urls.to_vec();
    urls.sort();
    urls
}
