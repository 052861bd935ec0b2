//! Statistics for a single crawl run
//!
//! This module provides the counters the crawl engine keeps while it runs
//! and the summary printed when it stops.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Tasks popped and fully processed (including skipped ones)
    pub tasks_completed: u64,

    /// Pages fetched from the archive
    pub pages_fetched: u64,

    /// Folder listings expanded
    pub containers_expanded: u64,

    /// Assets downloaded and written
    pub assets_downloaded: u64,

    /// Assets skipped because the file already existed
    pub assets_skipped: u64,

    /// Pages with neither a folder nor an asset marker
    pub unknown_pages: u64,

    /// New tasks added to the frontier
    pub tasks_enqueued: u64,

    /// Total asset bytes written
    pub bytes_downloaded: u64,

    /// Checkpoints saved (periodic, interrupt, and final)
    pub checkpoints_saved: u64,
}

impl CrawlStatistics {
    /// Logs a one-line summary of the run
    pub fn log_summary(&self, elapsed: Duration) {
        tracing::info!(
            "Run summary: {} tasks in {:.1?} ({} pages fetched, {} folders, \
             {} assets downloaded, {} skipped, {} unknown, {} bytes)",
            self.tasks_completed,
            elapsed,
            self.pages_fetched,
            self.containers_expanded,
            self.assets_downloaded,
            self.assets_skipped,
            self.unknown_pages,
            self.bytes_downloaded
        );
    }

    /// Tasks processed per second over `elapsed`
    pub fn rate(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tasks_completed as f64 / secs
        } else {
            0.0
        }
    }
}
