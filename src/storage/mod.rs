//! Storage module for persisting crawl progress
//!
//! This module handles durable checkpoints of the crawl frontier, including:
//! - The checkpoint backend trait
//! - A JSON file backend with two records (task queue, seen URL set)
//! - Atomic-replace writes shared with the asset writer

mod atomic;
mod json;
mod traits;

pub use atomic::{remove_stale_temp_files, write_atomic, TEMP_PREFIX};
pub use json::JsonCheckpointStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::crawler::Task;
use std::collections::HashSet;

/// A point-in-time copy of the frontier
///
/// `queue` is in frontier storage order (see `Frontier`); `seen` holds every
/// URL ever enqueued, including those still in `queue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    pub queue: Vec<Task>,
    pub seen: HashSet<String>,
}

impl FrontierSnapshot {
    /// Returns true if no work is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Adds every queued URL to the seen set
    ///
    /// Returns the number of URLs that were missing.
    pub fn reconcile(&mut self) -> usize {
        let mut added = 0;
        for task in &self.queue {
            if self.seen.insert(task.url.clone()) {
                added += 1;
            }
        }
        added
    }
}
