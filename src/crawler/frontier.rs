//! Frontier of pending crawl tasks
//!
//! This module handles:
//! - The ordered queue of pending tasks (LIFO or FIFO)
//! - The seen set of every URL ever enqueued
//! - Snapshots for checkpointing and restoring from one

use crate::config::Traversal;
use crate::storage::FrontierSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

/// One unit of pending work
///
/// Fetch `url`; if it is a folder, `path` is its directory, if it is an
/// asset, `path` plus the asset extension is the downloaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Destination on the local filesystem
    pub path: PathBuf,

    /// Source URL in the archive
    pub url: String,
}

impl Task {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

/// The in-memory work queue plus its deduplicating seen set
///
/// Tasks are stored oldest-first. LIFO pops from the back (depth-first: one
/// branch is finished before its siblings, which keeps the queue short), FIFO
/// pops from the front (roughly level-order). Snapshots keep the stored
/// order, so a restored frontier pops in exactly the same order.
#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<Task>,
    seen: HashSet<String>,
    traversal: Traversal,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(traversal: Traversal) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            traversal,
        }
    }

    /// Creates a frontier holding just the seed task
    pub fn seeded(traversal: Traversal, seed: Task) -> Self {
        let mut frontier = Self::new(traversal);
        frontier.enqueue(seed);
        frontier
    }

    /// Restores a frontier from a checkpoint snapshot
    ///
    /// Queued URLs are added to the seen set if a damaged checkpoint lost
    /// them.
    pub fn from_snapshot(traversal: Traversal, snapshot: FrontierSnapshot) -> Self {
        let FrontierSnapshot { queue, mut seen } = snapshot;
        seen.extend(queue.iter().map(|task| task.url.clone()));
        Self {
            queue: queue.into(),
            seen,
            traversal,
        }
    }

    /// Adds `task` unless its URL has been enqueued before
    ///
    /// This is the only place uniqueness is decided. The URL is marked seen
    /// here, at enqueue time, so a link discovered from several parents
    /// yields one task.
    ///
    /// # Returns
    ///
    /// `true` if the task was added
    pub fn enqueue(&mut self, task: Task) -> bool {
        if !self.seen.insert(task.url.clone()) {
            return false;
        }
        self.queue.push_back(task);
        true
    }

    /// Removes the next task according to the traversal discipline
    pub fn pop(&mut self) -> Option<Task> {
        match self.traversal {
            Traversal::Lifo => self.queue.pop_back(),
            Traversal::Fifo => self.queue.pop_front(),
        }
    }

    /// Puts a popped task back so it is the next one popped
    ///
    /// Used when processing a task fails, so the task survives into the
    /// checkpoint. Its URL is already seen, which is why this bypasses
    /// `enqueue`.
    pub fn restore(&mut self, task: Task) {
        debug_assert!(self.seen.contains(&task.url));
        match self.traversal {
            Traversal::Lifo => self.queue.push_back(task),
            Traversal::Fifo => self.queue.push_front(task),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs ever enqueued
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if `url` has ever been enqueued
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Copies the current state for checkpointing
    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            queue: self.queue.iter().cloned().collect(),
            seen: self.seen.clone(),
        }
    }

    /// Iterates over pending tasks in pop order
    pub fn pending(&self) -> Box<dyn Iterator<Item = &Task> + '_> {
        match self.traversal {
            Traversal::Lifo => Box::new(self.queue.iter().rev()),
            Traversal::Fifo => Box::new(self.queue.iter()),
        }
    }
}
