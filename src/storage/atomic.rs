//! Atomic file replacement
//!
//! Content is written to a temporary file in the destination's directory,
//! flushed to disk, then renamed over the destination. Readers see either the
//! old file or the complete new one, never a partial write.
//!
//! Temporary files carry the `.sumi-` prefix. A process killed mid-write
//! leaves one behind; `remove_stale_temp_files` sweeps them.

use std::io::{self, Write};
use std::path::Path;
use tempfile::Builder;

/// File name prefix of in-progress writes
pub const TEMP_PREFIX: &str = ".sumi-";

/// Atomically replaces `path` with `bytes`
///
/// Creates the parent directory if needed. The temporary file is removed if
/// any step fails before the rename.
///
/// # Arguments
///
/// * `path` - Final location of the file
/// * `bytes` - Complete file content
///
/// # Returns
///
/// * `Ok(())` - `path` now holds exactly `bytes`
/// * `Err(io::Error)` - Nothing visible changed at `path`
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir)?;

    let mut tmp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    sync_dir(dir);
    Ok(())
}

/// Deletes leftover in-progress writes directly inside `dir`
///
/// Only regular files named with `TEMP_PREFIX` are touched. Call this only
/// while no write into `dir` is in flight.
///
/// # Returns
///
/// * `Ok(usize)` - Number of files removed
/// * `Err(io::Error)` - `dir` could not be listed
pub fn remove_stale_temp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_temp = entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX);
        if !is_temp || !entry.file_type()?.is_file() {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::debug!("Removed stale temp file {}", entry.path().display());
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

/// Directory a file lives in; a bare file name lives in "."
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Flushes the directory entry so the rename itself survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = std::fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!("Directory sync failed for {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
