use crate::state::{CrawlResult, PageError};
use crate::url::get_host;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Violations of the pending-task protocol
///
/// These are programming errors, never per-page failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("pending task counter underflow while resolving {0}")]
    PendingUnderflow(String),

    #[error("crawl completion signal was dropped before the crawl finished")]
    CompletionLost,
}

/// Outcome of offering a candidate link to the crawl state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The link was new and within depth; a download task must be submitted
    Scheduled { host: String, depth: u32 },

    /// The link would sit deeper than the maximum depth
    TooDeep,

    /// The link was already discovered earlier in this crawl
    AlreadyVisited,

    /// The link is not a valid absolute URL; recorded as an error
    Malformed,
}

/// Bookkeeping for one crawl invocation
///
/// Every mutation happens under the coordinator's lock, so the
/// check-and-insert on `visited` and the `pending` updates are atomic with
/// respect to each other.
#[derive(Debug)]
pub struct CrawlState {
    /// URLs already scheduled or resolved; the single dedup gate
    visited: HashSet<String>,

    /// Submitted tasks (downloads and extractions) not yet folded back in
    pending: usize,

    /// Maximum depth, the seed sits at depth 1
    max_depth: u32,

    /// Depth at which each URL was first discovered
    depth_of: HashMap<String, u32>,

    /// Successfully downloaded URLs in completion order
    downloaded: Vec<String>,

    /// Per-URL failures
    errors: HashMap<String, PageError>,
}

impl CrawlState {
    /// Creates an empty state for a crawl bounded by `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            visited: HashSet::new(),
            pending: 0,
            max_depth,
            depth_of: HashMap::new(),
            downloaded: Vec::new(),
            errors: HashMap::new(),
        }
    }

    /// Offers a link discovered on a page at `parent_depth`
    ///
    /// The seed is offered with `parent_depth = 0`. A scheduled link counts
    /// as one pending task immediately; the caller must submit exactly one
    /// download task for it.
    pub fn admit(&mut self, url: &str, parent_depth: u32) -> Admission {
        let depth = parent_depth.saturating_add(1);
        if depth > self.max_depth {
            return Admission::TooDeep;
        }

        if !self.visited.insert(url.to_string()) {
            return Admission::AlreadyVisited;
        }

        match get_host(url) {
            Ok(host) => {
                self.depth_of.insert(url.to_string(), depth);
                self.pending += 1;
                Admission::Scheduled { host, depth }
            }
            Err(e) => {
                tracing::debug!("Rejecting malformed URL {}: {}", url, e);
                self.errors.insert(url.to_string(), e.into());
                Admission::Malformed
            }
        }
    }

    /// Records a successful download
    ///
    /// The extraction task that follows is counted before the download task
    /// is resolved, so the counter cannot touch zero in between.
    pub fn record_downloaded(&mut self, url: &str) -> Result<usize, StateError> {
        self.downloaded.push(url.to_string());
        self.task_started();
        self.task_resolved(url)
    }

    /// Records a failed download and resolves its task
    pub fn record_download_failed(
        &mut self,
        url: &str,
        error: PageError,
    ) -> Result<usize, StateError> {
        self.errors.insert(url.to_string(), error);
        self.task_resolved(url)
    }

    /// Records a failed extraction and resolves its task
    ///
    /// A page keeps at most one entry in the error map.
    pub fn record_extract_failed(
        &mut self,
        url: &str,
        error: PageError,
    ) -> Result<usize, StateError> {
        self.errors.entry(url.to_string()).or_insert(error);
        self.task_resolved(url)
    }

    /// Counts one more in-flight task
    pub fn task_started(&mut self) {
        self.pending += 1;
    }

    /// Resolves one in-flight task and returns the remaining count
    pub fn task_resolved(&mut self, url: &str) -> Result<usize, StateError> {
        self.pending = self
            .pending
            .checked_sub(1)
            .ok_or_else(|| StateError::PendingUnderflow(url.to_string()))?;
        Ok(self.pending)
    }

    /// Returns the number of unresolved tasks
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns the configured maximum depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns the depth at which a URL was first scheduled
    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.depth_of.get(url).copied()
    }

    /// Returns whether a URL has been discovered in this crawl
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns downloaded URLs in completion order
    pub fn downloaded(&self) -> &[String] {
        &self.downloaded
    }

    /// Returns the per-URL errors recorded so far
    pub fn errors(&self) -> &HashMap<String, PageError> {
        &self.errors
    }

    /// Takes the accumulated result out of the state
    pub fn take_result(&mut self) -> CrawlResult {
        CrawlResult {
            downloaded: std::mem::take(&mut self.downloaded),
            errors: std::mem::take(&mut self.errors),
        }
    }
}
