//! Mapping archive titles onto local paths

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Replacement for a run of characters that cannot appear in a path segment
const REPLACEMENT: char = '_';

/// Maps display text to a single safe path segment
///
/// Runs of `\ / : " * ? < > |` and control characters collapse to one `_`,
/// surrounding whitespace is trimmed, and names that would escape or alias
/// the parent directory (empty, `.`, `..`) become `untitled`.
///
/// # Example
///
/// ```
/// use sumi_mirror::output::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Reports 1900/1901: \"Daily\""), "Reports 1900_1901_ _Daily_");
/// assert_eq!(sanitize_filename(".."), "untitled");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.chars() {
        if is_forbidden(c) {
            if !in_run {
                out.push(REPLACEMENT);
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }

    let trimmed = out.trim();
    match trimmed {
        "" | "." | ".." => "untitled".to_string(),
        _ => trimmed.to_string(),
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '"' | '*' | '?' | '<' | '>' | '|') || c.is_control()
}

/// File path an asset task materializes to
///
/// The extension is appended to the destination's final component unless it
/// already ends with it (case-insensitively), so "Report" and "Report.pdf"
/// both become "Report.pdf" while "Vol. 3" becomes "Vol. 3.pdf".
pub fn asset_path(destination: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension);

    let already_has_extension = destination
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            name.len() > suffix.len()
                && name
                    .to_ascii_lowercase()
                    .ends_with(&suffix.to_ascii_lowercase())
        })
        .unwrap_or(false);

    if already_has_extension {
        return destination.to_path_buf();
    }

    let mut name: OsString = destination.as_os_str().to_owned();
    name.push(&suffix);
    PathBuf::from(name)
}

/// Returns true if `destination` could name an asset file
///
/// Destinations with no final component (the seed root ".", "/", "..") are
/// directories only.
pub fn can_hold_asset(destination: &Path) -> bool {
    destination.file_name().is_some()
}
