use crate::state::{ErrorKind, PageError};
use std::collections::HashMap;

/// Aggregated outcome of one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// Successfully downloaded URLs, in completion order
    pub downloaded: Vec<String>,

    /// Per-URL failures
    pub errors: HashMap<String, PageError>,
}

impl CrawlResult {
    /// Returns whether the URL was downloaded successfully
    pub fn is_downloaded(&self, url: &str) -> bool {
        self.downloaded.iter().any(|u| u == url)
    }

    /// Returns the error classification recorded for a URL, if any
    pub fn error_kind(&self, url: &str) -> Option<ErrorKind> {
        self.errors.get(url).map(PageError::kind)
    }

    /// Returns the number of distinct URLs that reached a terminal state
    pub fn total_pages(&self) -> usize {
        let errored_only = self
            .errors
            .keys()
            .filter(|url| !self.is_downloaded(url))
            .count();
        self.downloaded.len() + errored_only
    }

    /// Returns the number of errors of the given kind
    pub fn count_errors(&self, kind: ErrorKind) -> usize {
        self.errors.values().filter(|e| e.kind() == kind).count()
    }
}
