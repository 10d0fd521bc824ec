//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Summarising a [`CrawlResult`](crate::CrawlResult) into statistics
//! - Printing statistics to stdout
//! - Writing a markdown report of downloaded pages and errors

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report, ReportInfo};
pub use stats::{print_statistics, CrawlStatistics};
