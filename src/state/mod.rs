//! State module for tracking crawl progress
//!
//! This module provides the lifecycle state machine for a single crawl run.
//!
//! # Components
//!
//! - `CrawlState`: Tracks where a run is (idle, running, draining after an
//!   interrupt, completed, or failed) and which transitions are legal

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
