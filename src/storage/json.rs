//! JSON file checkpoint backend
//!
//! The checkpoint is kept in two records:
//! - the queue record, an ordered array of `{"path": ..., "url": ...}`
//! - the seen record, an array of URL strings (sorted for stable diffs)
//!
//! Each record is replaced atomically. The queue record is written first and
//! removed first, which makes it the commit marker for the pair:
//! - a lone seen record (crash during `clear`) is ignored by `load`
//! - a queue record newer than the seen record (crash between the two writes
//!   of `save`) is reconciled by adding every queued URL to the seen set, so
//!   the skew can only cause a URL to be rediscovered, never lost

use crate::crawler::Task;
use crate::storage::atomic::write_atomic;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::FrontierSnapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Checkpoint store backed by two JSON files
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    queue_path: PathBuf,
    seen_path: PathBuf,
}

impl JsonCheckpointStore {
    /// Creates a store over the given record locations
    ///
    /// Nothing is touched on disk until the first `save`.
    pub fn new(queue_path: impl Into<PathBuf>, seen_path: impl Into<PathBuf>) -> Self {
        Self {
            queue_path: queue_path.into(),
            seen_path: seen_path.into(),
        }
    }

    /// Creates a store from the `[checkpoint]` configuration section
    pub fn from_config(config: &crate::config::CheckpointConfig) -> Self {
        Self::new(&config.queue_path, &config.seen_path)
    }

    pub fn queue_path(&self) -> &Path {
        &self.queue_path
    }

    pub fn seen_path(&self) -> &Path {
        &self.seen_path
    }

    /// Returns true if a resumable checkpoint exists
    pub fn exists(&self) -> bool {
        self.queue_path.is_file()
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn save(&mut self, snapshot: &FrontierSnapshot) -> StorageResult<()> {
        let mut seen: Vec<&String> = snapshot.seen.iter().collect();
        seen.sort();

        write_record(&self.queue_path, &snapshot.queue)?;
        write_record(&self.seen_path, &seen)?;

        tracing::debug!(
            "Checkpoint saved: {} queued, {} seen",
            snapshot.queue.len(),
            snapshot.seen.len()
        );
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<FrontierSnapshot>> {
        let queue: Vec<Task> = match read_record(&self.queue_path)? {
            Some(queue) => queue,
            None => {
                if self.seen_path.exists() {
                    tracing::warn!(
                        "Ignoring {} without a matching {}",
                        self.seen_path.display(),
                        self.queue_path.display()
                    );
                }
                return Ok(None);
            }
        };

        let seen: HashSet<String> = match read_record::<Vec<String>>(&self.seen_path)? {
            Some(seen) => seen.into_iter().collect(),
            None => {
                tracing::warn!(
                    "{} is missing, rebuilding seen set from the queue",
                    self.seen_path.display()
                );
                HashSet::new()
            }
        };

        let mut snapshot = FrontierSnapshot { queue, seen };
        let missing = snapshot.reconcile();
        if missing > 0 {
            tracing::warn!(
                "{} queued URLs were missing from the seen set; \
                 the checkpoint was interrupted mid-save",
                missing
            );
        }

        Ok(Some(snapshot))
    }

    fn clear(&mut self) -> StorageResult<()> {
        remove_if_exists(&self.queue_path)?;
        remove_if_exists(&self.seen_path)?;
        tracing::debug!("Checkpoint cleared");
        Ok(())
    }
}

fn write_record<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes).map_err(|e| StorageError::io(path, e))
}

fn read_record<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
}

fn remove_if_exists(path: &Path) -> StorageResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(path, e)),
    }
}
