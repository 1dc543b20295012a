//! Deduplication, ordering and capping of collected items.

use itertools::Itertools;
use tracing::{info, instrument};

use crate::models::NormalizedItem;

/// Sort newest first and drop repeats of the same story.
///
/// The sort is stable, so items with equal timestamps keep collection order
/// (feed-list order, then order within the feed). Scanning in that order and
/// keeping the first occurrence of each [`NormalizedItem::dedup_key`] means
/// the newest copy of a story is the one that survives.
#[instrument(level = "info", skip_all, fields(input = items.len()))]
pub fn dedupe(mut items: Vec<NormalizedItem>) -> Vec<NormalizedItem> {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let input = items.len();
    let unique = items
        .into_iter()
        .unique_by(NormalizedItem::dedup_key)
        .collect::<Vec<_>>();
    info!(kept = unique.len(), removed = input - unique.len(), "Deduplicated items");
    unique
}

/// Keep the first `max` items; `0` means no cap.
///
/// Applied after [`dedupe`], so the items kept are the most recent ones.
pub fn cap(mut items: Vec<NormalizedItem>, max: usize) -> Vec<NormalizedItem> {
    if max > 0 && items.len() > max {
        info!(max, dropped = items.len() - max, "Capping item count");
        items.truncate(max);
    }
    items
}
