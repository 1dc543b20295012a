//! Collection and normalization of feed entries.
//!
//! Each feed is fetched, parsed, and every entry is either turned into a
//! [`NormalizedItem`] inside the report window or dropped with a
//! [`DropReason`]. Failures are absorbed at the narrowest level possible: a
//! broken feed loses only that feed, a broken entry loses only that entry.

use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::feeds::FeedFetcher;
use crate::feeds::dates::parse_timestamp;
use crate::feeds::parse::parse_feed;
use crate::models::{FeedSource, NormalizedItem, RawEntry, ReportWindow};
use crate::utils::{clean_summary, collapse_whitespace, strip_fragment, truncate_for_log};
use crate::window::to_report_tz;

/// Per-run knobs for normalization.
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Report timezone every timestamp is converted into.
    pub tz: Tz,
    /// Summary character limit; `None` skips summary extraction.
    pub summary_limit: Option<usize>,
}

/// Why an entry did not make it into the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingTitle,
    MissingLink,
    MissingTimestamp,
    UnparseableTimestamp,
    OutsideWindow,
}

/// Tally of dropped entries, logged per feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropCounts {
    pub missing_title: usize,
    pub missing_link: usize,
    pub missing_timestamp: usize,
    pub unparseable_timestamp: usize,
    pub outside_window: usize,
}

impl DropCounts {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingTitle => self.missing_title += 1,
            DropReason::MissingLink => self.missing_link += 1,
            DropReason::MissingTimestamp => self.missing_timestamp += 1,
            DropReason::UnparseableTimestamp => self.unparseable_timestamp += 1,
            DropReason::OutsideWindow => self.outside_window += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_title
            + self.missing_link
            + self.missing_timestamp
            + self.unparseable_timestamp
            + self.outside_window
    }

    fn add(&mut self, other: &DropCounts) {
        self.missing_title += other.missing_title;
        self.missing_link += other.missing_link;
        self.missing_timestamp += other.missing_timestamp;
        self.unparseable_timestamp += other.unparseable_timestamp;
        self.outside_window += other.outside_window;
    }
}

/// Everything one pass over the feed list produced.
#[derive(Debug, Default)]
pub struct Collection {
    /// In feed-list order, then document order within each feed.
    pub items: Vec<NormalizedItem>,
    /// Feeds that were fetched and parsed.
    pub sources: Vec<FeedSource>,
    /// Feeds that contributed nothing because fetch or parse failed.
    pub failed_feeds: usize,
    pub dropped: DropCounts,
}

type FieldAccessor = fn(&RawEntry) -> Option<&str>;

fn published(e: &RawEntry) -> Option<&str> {
    e.published.as_deref()
}
fn updated(e: &RawEntry) -> Option<&str> {
    e.updated.as_deref()
}
fn created(e: &RawEntry) -> Option<&str> {
    e.created.as_deref()
}
fn pub_date(e: &RawEntry) -> Option<&str> {
    e.pub_date.as_deref()
}
fn summary(e: &RawEntry) -> Option<&str> {
    e.summary.as_deref()
}
fn description(e: &RawEntry) -> Option<&str> {
    e.description.as_deref()
}
fn content(e: &RawEntry) -> Option<&str> {
    e.content.as_deref()
}

/// Timestamp candidates in priority order.
const TIMESTAMP_FIELDS: [FieldAccessor; 4] = [published, updated, created, pub_date];

/// Summary candidates in priority order.
const SUMMARY_FIELDS: [FieldAccessor; 3] = [summary, description, content];

/// First accessor that yields a non-blank value.
fn first_present<'a>(entry: &'a RawEntry, fields: &[FieldAccessor]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| field(entry).map(str::trim).filter(|v| !v.is_empty()))
}

/// Validate one raw entry and bring it into the report timezone.
pub fn normalize_entry(
    entry: &RawEntry,
    source: &str,
    window: &ReportWindow,
    opts: &CollectOptions,
) -> Result<NormalizedItem, DropReason> {
    let title = entry
        .title
        .as_deref()
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .ok_or(DropReason::MissingTitle)?;

    let link = entry
        .link
        .as_deref()
        .map(|l| strip_fragment(l.trim()).to_string())
        .filter(|l| !l.is_empty())
        .ok_or(DropReason::MissingLink)?;

    let raw_ts = first_present(entry, &TIMESTAMP_FIELDS).ok_or(DropReason::MissingTimestamp)?;
    let parsed = parse_timestamp(raw_ts).ok_or(DropReason::UnparseableTimestamp)?;
    let timestamp = to_report_tz(&parsed, opts.tz);

    if !window.contains(&timestamp) {
        return Err(DropReason::OutsideWindow);
    }

    let summary = opts.summary_limit.and_then(|limit| {
        first_present(entry, &SUMMARY_FIELDS).and_then(|raw| clean_summary(raw, limit))
    });

    Ok(NormalizedItem {
        title,
        link,
        source: source.to_string(),
        timestamp,
        summary,
    })
}

/// Fetch every feed in order and collect the entries that fall in `window`.
#[instrument(level = "info", skip_all, fields(feeds = urls.len()))]
pub async fn collect_items<F: FeedFetcher>(
    fetcher: &F,
    urls: &[String],
    window: &ReportWindow,
    opts: &CollectOptions,
) -> Collection {
    let outcomes: Vec<Option<FeedOutcome>> = stream::iter(urls)
        .then(|url| async move { collect_feed(fetcher, url, window, opts).await })
        .collect()
        .await;

    let mut collection = Collection::default();
    for outcome in outcomes {
        match outcome {
            Some(feed) => {
                collection.items.extend(feed.items);
                collection.sources.push(feed.source);
                collection.dropped.add(&feed.dropped);
            }
            None => collection.failed_feeds += 1,
        }
    }

    info!(
        items = collection.items.len(),
        ok_feeds = collection.sources.len(),
        failed_feeds = collection.failed_feeds,
        dropped = collection.dropped.total(),
        "Collected items from all feeds"
    );
    collection
}

struct FeedOutcome {
    source: FeedSource,
    items: Vec<NormalizedItem>,
    dropped: DropCounts,
}

#[instrument(level = "info", skip(fetcher, window, opts))]
async fn collect_feed<F: FeedFetcher>(
    fetcher: &F,
    url: &str,
    window: &ReportWindow,
    opts: &CollectOptions,
) -> Option<FeedOutcome> {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed; skipping feed");
            return None;
        }
    };

    let feed = match parse_feed(&body) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(&body, 200),
                "Feed parse failed; skipping feed"
            );
            return None;
        }
    };

    let source = FeedSource::new(url, feed.title.as_deref());
    let mut items = Vec::new();
    let mut dropped = DropCounts::default();
    for entry in &feed.entries {
        match normalize_entry(entry, &source.name, window, opts) {
            Ok(item) => items.push(item),
            Err(reason) => {
                debug!(?reason, title = ?entry.title, "Dropped entry");
                dropped.record(reason);
            }
        }
    }

    info!(
        source = %source.name,
        feed_url = %source.url,
        entries = feed.entries.len(),
        kept = items.len(),
        missing_title = dropped.missing_title,
        missing_link = dropped.missing_link,
        missing_timestamp = dropped.missing_timestamp,
        unparseable_timestamp = dropped.unparseable_timestamp,
        outside_window = dropped.outside_window,
        "Collected feed"
    );

    Some(FeedOutcome {
        source,
        items,
        dropped,
    })
}
