//! Statistics generation from a crawl result

use crate::state::{CrawlResult, ErrorKind};
use crate::url::get_host;
use std::collections::{BTreeMap, HashSet};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Distinct URLs that reached a terminal state
    pub total_pages: usize,

    /// Pages downloaded successfully
    pub downloaded: usize,

    /// Error counts per classification (every kind present, possibly zero)
    pub errors_by_kind: BTreeMap<ErrorKind, usize>,

    /// Distinct hosts among downloaded pages
    pub unique_hosts: usize,
}

impl CrawlStatistics {
    /// Computes statistics for a finished crawl
    pub fn from_result(result: &CrawlResult) -> Self {
        let errors_by_kind = ErrorKind::ALL
            .iter()
            .map(|kind| (*kind, result.count_errors(*kind)))
            .collect();

        let unique_hosts = result
            .downloaded
            .iter()
            .filter_map(|url| get_host(url).ok())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_pages: result.total_pages(),
            downloaded: result.downloaded.len(),
            errors_by_kind,
            unique_hosts,
        }
    }

    /// Total number of recorded errors
    pub fn total_errors(&self) -> usize {
        self.errors_by_kind.values().sum()
    }

    /// Share of pages downloaded successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.downloaded as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages reached: {}", stats.total_pages);
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Unique hosts: {}", stats.unique_hosts);
    println!();

    if stats.total_errors() > 0 {
        println!("Errors:");
        for (kind, count) in stats.errors_by_kind.iter().filter(|(_, c)| **c > 0) {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages downloaded)",
        stats.success_rate(),
        stats.downloaded,
        stats.total_pages
    );
}
