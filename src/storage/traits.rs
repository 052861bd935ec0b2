//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::storage::FrontierSnapshot;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed checkpoint record {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// A checkpoint is the pair (pending task queue, seen URL set). Backends only
/// persist and restore that pair; they know nothing about how it is produced.
pub trait CheckpointStore {
    /// Durably replaces the stored checkpoint with `snapshot`
    ///
    /// Both halves are written on every call. When this returns `Ok`, a
    /// subsequent `load` (even from a new process) observes `snapshot`.
    fn save(&mut self, snapshot: &FrontierSnapshot) -> StorageResult<()>;

    /// Reads the stored checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Some(snapshot))` - A checkpoint exists
    /// * `Ok(None)` - No checkpoint; the caller should seed a fresh crawl
    /// * `Err(StorageError)` - A record exists but could not be read
    fn load(&self) -> StorageResult<Option<FrontierSnapshot>>;

    /// Removes the stored checkpoint
    ///
    /// Only called once the frontier is confirmed empty.
    fn clear(&mut self) -> StorageResult<()>;
}
