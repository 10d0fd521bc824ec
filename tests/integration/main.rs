//! Integration tests for the crawler
//!
//! `crawl_tests` drives the crawler over in-memory link graphs; `http_tests`
//! uses wiremock servers to exercise the HTTP downloader end to end.

mod http_tests;
mod support;
