//! Crawler module for archive traversal
//!
//! This module contains the core crawling logic, including:
//! - The frontier of pending tasks and its seen set
//! - HTTP fetching
//! - Page classification (folder, asset, unknown)
//! - The crawl engine that ties them together

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{initial_frontier, run_crawl, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, fetch_bytes, fetch_page, FetchedPage};
pub use frontier::{Frontier, Task};
pub use parser::{ChildLink, Classification, Classifier};
