//! Data models for feed entries and the rendered digest.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedSource`]: A feed URL paired with its display name
//! - [`RawEntry`] and [`ParsedFeed`]: Entries as they come out of the XML parser
//! - [`NormalizedItem`]: A validated entry in the report timezone
//! - [`ReportWindow`] and [`Report`]: The terminal artifact of one run

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// A feed endpoint and the name it is shown under in the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// The URL the feed was fetched from.
    pub url: String,
    /// Feed-declared title, or the URL host when the feed has none.
    pub name: String,
}

impl FeedSource {
    /// Build a source, falling back to the URL's host when `title` is blank.
    ///
    /// A URL that does not parse (or has no host) falls back to the URL
    /// itself so the row still names where it came from.
    pub fn new(url: &str, title: Option<&str>) -> Self {
        let name = match title.map(str::trim) {
            Some(t) if !t.is_empty() => crate::utils::collapse_whitespace(t),
            _ => url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| url.to_string()),
        };
        Self {
            url: url.to_string(),
            name,
        }
    }
}

/// One feed item as parsed, before any validation.
///
/// Every field is the raw text of the matching element. Timestamp candidates
/// are kept as strings so that the collector decides how to parse them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Atom `published`/`issued`, Dublin Core `dc:date`.
    pub published: Option<String>,
    /// Atom `updated`/`modified`.
    pub updated: Option<String>,
    /// Atom 0.3 `created`, `dcterms:created`.
    pub created: Option<String>,
    /// RSS `pubDate`.
    pub pub_date: Option<String>,
    /// Atom `summary`.
    pub summary: Option<String>,
    /// RSS `description`.
    pub description: Option<String>,
    /// `content:encoded` or Atom `content`.
    pub content: Option<String>,
}

/// A fetched feed: its declared title and entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// A feed entry reduced to what the digest shows.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    /// Whitespace-collapsed, never empty.
    pub title: String,
    /// Entry URL without its fragment. The query string is kept.
    pub link: String,
    /// Display name of the originating feed.
    pub source: String,
    /// Publish time in the report timezone.
    pub timestamp: DateTime<Tz>,
    /// Plain-text excerpt, when summaries are enabled and the entry has one.
    pub summary: Option<String>,
}

impl NormalizedItem {
    /// Identity used to detect the same story across feeds.
    ///
    /// The link loses its query string and both parts are lowercased, so
    /// tracking parameters and title casing do not split duplicates.
    pub fn dedup_key(&self) -> (String, String) {
        let base = self.link.split('?').next().unwrap_or_default();
        (base.to_lowercase(), self.title.to_lowercase())
    }
}

/// Closed interval `[start, end]` of instants in the report timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ReportWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, ts: &DateTime<Tz>) -> bool {
        *ts >= self.start && *ts <= self.end
    }

    /// Calendar date of `end`, which keys the dated output file.
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// The ordered, deduplicated digest for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub window: ReportWindow,
    /// Number of feeds in the feed list, reachable or not.
    pub feed_count: usize,
    pub items: Vec<NormalizedItem>,
}

impl Report {
    /// Date shown in the heading and used for the dated filename.
    pub fn date(&self) -> NaiveDate {
        self.window.end_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Seoul;

    fn item(link: &str, title: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            link: link.to_string(),
            source: "Example".to_string(),
            timestamp: Seoul.with_ymd_and_hms(2025, 5, 6, 5, 0, 0).unwrap(),
            summary: None,
        }
    }

    #[test]
    fn test_feed_source_prefers_title() {
        let src = FeedSource::new("https://www.cnbc.com/id/100003114/device/rss/rss.html", Some("  US Top News "));
        assert_eq!(src.name, "US Top News");
    }

    #[test]
    fn test_feed_source_falls_back_to_host() {
        let src = FeedSource::new("https://www.cnbc.com/id/100003114/device/rss/rss.html", Some("   "));
        assert_eq!(src.name, "www.cnbc.com");
        let src = FeedSource::new("https://feeds.example.org/rss", None);
        assert_eq!(src.name, "feeds.example.org");
    }

    #[test]
    fn test_feed_source_unparseable_url() {
        let src = FeedSource::new("not a url", None);
        assert_eq!(src.name, "not a url");
    }

    #[test]
    fn test_dedup_key_ignores_query_and_case() {
        let a = item("https://Example.com/story?utm=rss", "Fed Raises Rates");
        let b = item("https://example.com/story?utm=email", "fed raises rates");
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(
            a.dedup_key(),
            ("https://example.com/story".to_string(), "fed raises rates".to_string())
        );
    }

    #[test]
    fn test_dedup_key_distinguishes_paths() {
        let a = item("https://example.com/a", "Same");
        let b = item("https://example.com/b", "Same");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let start = Seoul.with_ymd_and_hms(2025, 5, 5, 22, 0, 0).unwrap();
        let end = Seoul.with_ymd_and_hms(2025, 5, 6, 6, 0, 0).unwrap();
        let window = ReportWindow { start, end };

        assert!(window.contains(&start));
        assert!(window.contains(&end));
        assert!(!window.contains(&(start - Duration::seconds(1))));
        assert!(!window.contains(&(end + Duration::seconds(1))));
        assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
    }
}
