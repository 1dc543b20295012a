//! One digest run, from feed list to HTML files.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::collect::{CollectOptions, collect_items};
use crate::config::Settings;
use crate::dedup::{cap, dedupe};
use crate::error::Result;
use crate::feeds::FeedFetcher;
use crate::models::{Report, ReportWindow};
use crate::outputs::files::{ReportPaths, write_report};
use crate::outputs::html::{RenderOptions, render};
use crate::sources::load_feed_urls;
use crate::utils::ensure_writable_dir;
use crate::window::compute_window;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub count: usize,
    pub paths: ReportPaths,
    pub window: ReportWindow,
}

impl RunSummary {
    /// The completion line printed on stdout.
    pub fn status_line(&self) -> String {
        format!(
            "OK: {} items -> {}, {} (window {} ~ {})",
            self.count,
            self.paths.latest.display(),
            self.paths.dated.display(),
            self.window.start.to_rfc3339(),
            self.window.end.to_rfc3339()
        )
    }
}

/// Run the whole pipeline once, treating `now` as the current time.
///
/// # Errors
///
/// Only fatal conditions surface here: an unreadable feed list, an
/// unwritable output directory, or a failed write. Feed and entry failures
/// are logged and absorbed by the collector.
#[instrument(level = "info", skip_all, fields(%now))]
pub async fn run<F: FeedFetcher>(
    settings: &Settings,
    fetcher: &F,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let urls = load_feed_urls(&settings.feeds_file).await?;
    ensure_writable_dir(&settings.output_dir).await?;

    let window = compute_window(&settings.window, settings.tz, now);
    info!(start = %window.start, end = %window.end, "Report window");

    let opts = CollectOptions {
        tz: settings.tz,
        summary_limit: settings.summary_limit,
    };
    let collection = collect_items(fetcher, &urls, &window, &opts).await;

    let items = cap(dedupe(collection.items), settings.max_items);
    let report = Report {
        window,
        feed_count: urls.len(),
        items,
    };

    let render_opts = RenderOptions {
        title: settings.title.clone(),
        show_date: settings.show_date,
        show_summary: settings.summary_limit.is_some(),
    };
    let html = render(&report, &render_opts)?;
    let paths = write_report(&settings.output_dir, &settings.latest_name, report.date(), &html).await?;

    Ok(RunSummary {
        count: report.items.len(),
        paths,
        window,
    })
}
