//! State module for tracking crawl progress
//!
//! This module provides the bookkeeping owned by a single crawl invocation.
//!
//! # Components
//!
//! - `CrawlState`: visited set, depth table, pending-task counter, results and errors
//! - `PageError`: per-URL failure recorded without aborting the crawl
//! - `CrawlResult`: the aggregated outcome handed back to the caller

mod crawl_result;
mod crawl_state;
mod page_error;

// Re-export main types
pub use crawl_result::CrawlResult;
pub use crawl_state::{Admission, CrawlState, StateError};
pub use page_error::{ErrorKind, PageError};
