//! URL handling module for Sumi-Mirror
//!
//! Archive pages link with a mix of absolute and relative hrefs. Everything
//! the crawler enqueues goes through `resolve_link` first so the seen set
//! compares absolute URLs.

use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only (same page) anchors
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Example
///
/// ```
/// use sumi_mirror::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/archive/").unwrap();
/// assert_eq!(
///     resolve_link("folder/1", &base).as_deref(),
///     Some("https://example.com/archive/folder/1")
/// );
/// assert_eq!(resolve_link("mailto:a@example.com", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
