//! Feed list loading.
//!
//! The feed list is plain text: one URL per line, blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{DigestError, Result};

/// Read the feed list at `path`, preserving file order.
///
/// # Errors
///
/// Returns [`DigestError::FeedList`] if the file cannot be read. A missing
/// feed list is fatal; it never degrades to an empty run.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_feed_urls(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| DigestError::FeedList {
            path: path.display().to_string(),
            source,
        })?;
    let urls = parse_feed_list(&text);
    info!(count = urls.len(), "Loaded feed list");
    Ok(urls)
}

/// Extract feed URLs from feed list text.
pub fn parse_feed_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
