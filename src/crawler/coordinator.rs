//! Crawl coordinator - scheduling and completion protocol
//!
//! One `Coordinator` exists per crawl invocation and is the only owner of its
//! [`CrawlState`]. Workers never touch the state directly; they hand outcomes
//! back through `on_*` methods, each of which applies its state transition in
//! a single critical section:
//!
//! 1. A task is counted in `pending` before it is submitted.
//! 2. A task is uncounted only after its outcome, including any follow-up
//!    tasks it produced, has been folded into the state.
//!
//! So `pending` reaching zero means nothing is in flight and nothing more can
//! be produced, and the waiting caller is signalled exactly once.

use crate::crawler::fetcher::Downloader;
use crate::crawler::parser::Document;
use crate::crawler::pool::WorkerPool;
use crate::crawler::throttle::HostThrottle;
use crate::state::{Admission, CrawlResult, CrawlState, PageError, StateError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinSet;

/// Signal delivered to the crawl caller when the crawl settles
pub type Completion = oneshot::Receiver<Result<(), StateError>>;

/// Owner of one crawl's state and scheduling policy
pub struct Coordinator<D: Downloader> {
    state: Mutex<CrawlState>,
    downloader: Arc<D>,
    throttle: HostThrottle,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    done: Mutex<Option<oneshot::Sender<Result<(), StateError>>>>,
}

impl<D: Downloader> Coordinator<D> {
    /// Creates a coordinator for a crawl bounded by `max_depth`
    ///
    /// # Returns
    ///
    /// The coordinator and the receiver that resolves once no task is pending
    pub fn new(
        downloader: Arc<D>,
        download_pool: Arc<WorkerPool>,
        extract_pool: Arc<WorkerPool>,
        per_host: usize,
        max_depth: u32,
    ) -> (Arc<Self>, Completion) {
        let (tx, rx) = oneshot::channel();
        let coordinator = Arc::new(Self {
            state: Mutex::new(CrawlState::new(max_depth)),
            downloader,
            throttle: HostThrottle::new(per_host),
            download_pool,
            extract_pool,
            done: Mutex::new(Some(tx)),
        });
        (coordinator, rx)
    }

    /// Schedules the seed as if discovered on a page at depth 0
    ///
    /// A malformed seed is recorded as an error and completes the crawl
    /// immediately.
    pub fn start(self: &Arc<Self>, seed: &str) {
        let admission = self.lock_state().admit(seed, 0);

        match admission {
            Admission::Scheduled { host, depth } => {
                tracing::debug!("Scheduling seed {} (host {})", seed, host);
                self.submit_download(seed.to_string(), host, depth);
            }
            other => {
                tracing::warn!("Seed {} was not scheduled: {:?}", seed, other);
                self.finish(Ok(()));
            }
        }
    }

    /// Takes the accumulated result; meant to be called once the crawl settled
    pub fn take_result(&self) -> CrawlResult {
        self.lock_state().take_result()
    }

    /// Abandons the crawl: downloads still queued for a host slot fail
    ///
    /// Called when the caller stops waiting for completion.
    pub fn shutdown(&self) {
        self.throttle.close();
    }

    /// Number of tasks not yet resolved
    #[cfg(test)]
    fn pending(&self) -> usize {
        self.lock_state().pending()
    }

    /// Distinct hosts the throttle has seen
    pub fn hosts_seen(&self) -> usize {
        self.throttle.host_count()
    }

    fn submit_download(self: &Arc<Self>, url: String, host: String, depth: u32) {
        let coordinator = Arc::clone(self);
        let job_url = url.clone();
        let submitted = self
            .download_pool
            .submit(async move { coordinator.run_download(job_url, host, depth).await });

        if let Err(e) = submitted {
            self.on_download_failed(&url, PageError::Download(e.to_string()));
        }
    }

    fn submit_extract(self: &Arc<Self>, url: String, depth: u32, document: D::Document) {
        let coordinator = Arc::clone(self);
        let job_url = url.clone();
        let submitted = self
            .extract_pool
            .submit(async move { coordinator.run_extract(job_url, depth, document).await });

        if let Err(e) = submitted {
            self.on_extract_failed(&url, PageError::Extract(e.to_string()));
        }
    }

    /// Download worker body
    async fn run_download(self: Arc<Self>, url: String, host: String, depth: u32) {
        let outcome = match self.throttle.acquire(&host).await {
            Ok(permit) => {
                let outcome = self.download_isolated(&url).await;
                permit.release();
                outcome
            }
            Err(e) => Err(PageError::Download(e.to_string())),
        };

        match outcome {
            Ok(document) => self.on_downloaded(url, depth, document),
            Err(e) => self.on_download_failed(&url, e),
        }
    }

    /// Runs the download on its own task so a panicking downloader fails the
    /// page instead of leaving its task unresolved
    async fn download_isolated(&self, url: &str) -> Result<D::Document, PageError> {
        let downloader = Arc::clone(&self.downloader);
        let target = url.to_string();

        // Dropping the set aborts the download along with this worker
        let mut task = JoinSet::new();
        task.spawn(async move { downloader.download(&target).await });

        match task.join_next().await {
            Some(Ok(outcome)) => outcome,
            Some(Err(e)) => Err(PageError::Download(format!("download task failed: {}", e))),
            None => Err(PageError::Download("download task missing".to_string())),
        }
    }

    /// Extraction worker body
    async fn run_extract(self: Arc<Self>, url: String, depth: u32, document: D::Document) {
        let outcome = tokio::task::spawn_blocking(move || document.extract_links())
            .await
            .unwrap_or_else(|e| Err(PageError::Extract(format!("extraction task failed: {}", e))));

        match outcome {
            Ok(links) => self.on_extracted(&url, depth, links),
            Err(e) => self.on_extract_failed(&url, e),
        }
    }

    fn on_downloaded(self: &Arc<Self>, url: String, depth: u32, document: D::Document) {
        tracing::debug!("Downloaded {} (depth {})", url, depth);
        let resolved = self.lock_state().record_downloaded(&url);
        self.settle(resolved);
        self.submit_extract(url, depth, document);
    }

    fn on_download_failed(&self, url: &str, error: PageError) {
        tracing::warn!("Download failed for {}: {}", url, error);
        let resolved = self.lock_state().record_download_failed(url, error);
        self.settle(resolved);
    }

    fn on_extracted(self: &Arc<Self>, url: &str, depth: u32, links: Vec<String>) {
        let found = links.len();
        let (scheduled, resolved) = {
            let mut state = self.lock_state();
            let mut scheduled = Vec::new();
            for link in links {
                if let Admission::Scheduled { host, depth } = state.admit(&link, depth) {
                    scheduled.push((link, host, depth));
                }
            }
            // Children are counted above, before the extraction task is uncounted
            (scheduled, state.task_resolved(url))
        };

        tracing::debug!(
            "Extracted {} links from {}, scheduled {}",
            found,
            url,
            scheduled.len()
        );

        for (link, host, depth) in scheduled {
            self.submit_download(link, host, depth);
        }
        self.settle(resolved);
    }

    fn on_extract_failed(&self, url: &str, error: PageError) {
        tracing::warn!("Link extraction failed for {}: {}", url, error);
        let resolved = self.lock_state().record_extract_failed(url, error);
        self.settle(resolved);
    }

    /// Signals the caller when a resolution left nothing pending
    fn settle(&self, resolved: Result<usize, StateError>) {
        match resolved {
            Ok(0) => self.finish(Ok(())),
            Ok(_) => {}
            Err(e) => {
                tracing::error!("{}", e);
                self.finish(Err(e));
            }
        }
    }

    fn finish(&self, outcome: Result<(), StateError>) {
        let sender = self
            .done
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(tx) = sender {
            // The caller may have stopped waiting (crawler closed)
            let _ = tx.send(outcome);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
