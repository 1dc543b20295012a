//! Text cleanup and file system helpers.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace collapsing and link fragment stripping for entry fields
//! - Summary cleanup: tag stripping, entity decoding, truncation
//! - String truncation for log previews
//! - File system validation for the output directory

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::Result;

/// Marker appended to a summary that was cut at the character limit.
pub const ELLIPSIS: &str = "…";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// Entities decoded in summaries. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Collapse every run of whitespace (spaces, tabs, newlines) into one space
/// and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("Fed   Raises\tRates"), "Fed Raises Rates");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a `#fragment` suffix from a link. The query string is kept.
pub fn strip_fragment(link: &str) -> &str {
    match link.find('#') {
        Some(idx) => &link[..idx],
        None => link,
    }
}

/// Cut `s` to at most `limit` characters, appending [`ELLIPSIS`] when
/// anything was removed.
///
/// Counting is by `char`, so multi-byte text is never split mid-character.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{}", &s[..byte_idx], ELLIPSIS),
        None => s.to_string(),
    }
}

/// Turn an HTML-ish summary into a plain-text excerpt.
///
/// Tags are removed with a permissive pattern, a fixed set of entities is
/// decoded, whitespace is collapsed and the result is truncated to `limit`
/// characters. Returns `None` when nothing readable is left.
pub fn clean_summary(raw: &str, limit: usize) -> Option<String> {
    let stripped = TAG_RE.replace_all(raw, " ");
    let mut text = stripped.into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }
    let text = collapse_whitespace(&text);
    if text.is_empty() {
        None
    } else {
        Some(truncate_chars(&text, limit))
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
        None => s.to_string(),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    remove_probe(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

/// Delete the write probe; a failure is logged, not propagated.
fn remove_probe(probe_path: &Path) -> bool {
    match stdfs::remove_file(probe_path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %probe_path.display(), error = %e, "Failed to remove write probe");
            false
        }
    }
}
