//! HTML rendering of the digest.
//!
//! Feed titles, links and summaries are untrusted, so every interpolated
//! value goes through `html_escape`, and only `http`/`https` links become
//! anchors.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::{self, Write};

use crate::models::{NormalizedItem, Report};

/// Display format for window bounds.
const WINDOW_FMT: &str = "%Y-%m-%d %H:%M";

const STYLE: &str = "body{font-family:system-ui,-apple-system,Segoe UI,Roboto,sans-serif;max-width:840px;margin:40px auto;padding:0 1rem;line-height:1.6}
h1{margin-bottom:.2rem} ol{padding-left:1.4rem} li{margin:.5rem 0}
small,.when{color:#666} .when{font-variant-numeric:tabular-nums}
.summary{margin:.2rem 0 0;color:#333;font-size:.92rem}
.empty{list-style:none;color:#666}";

/// Presentation switches for [`render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Heading text, followed by the window end date.
    pub title: String,
    /// Show `MM-DD` next to each item's time.
    pub show_date: bool,
    /// Show the summary excerpt under each item.
    pub show_summary: bool,
}

/// Render a complete HTML document for `report`.
pub fn render(report: &Report, opts: &RenderOptions) -> Result<String, fmt::Error> {
    let window = &report.window;
    let heading = format!("{} · {}", opts.title, report.date().format("%Y-%m-%d"));
    let tz = window.end.timezone().name();
    let start = window.start.format(WINDOW_FMT).to_string();
    let end = window.end.format(WINDOW_FMT).to_string();

    let mut out = String::with_capacity(4096 + report.items.len() * 256);
    writeln!(out, "<!doctype html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    writeln!(out, "<title>{}</title>", encode_text(&heading))?;
    writeln!(out, "<style>\n{}\n</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>{}</h1>", encode_text(&heading))?;
    writeln!(
        out,
        "<small>Window: {} ~ {} {} · {} feeds · {} items · duplicates removed</small>",
        start,
        end,
        encode_text(tz),
        report.feed_count,
        report.items.len()
    )?;
    writeln!(out, "<ol class=\"items\">")?;

    if report.items.is_empty() {
        writeln!(
            out,
            "<li class=\"empty\">No items were collected between {} and {} ({}).</li>",
            start,
            end,
            encode_text(tz)
        )?;
    } else {
        for item in &report.items {
            write_row(&mut out, item, opts)?;
        }
    }

    writeln!(out, "</ol>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

fn write_row(out: &mut String, item: &NormalizedItem, opts: &RenderOptions) -> fmt::Result {
    let when = if opts.show_date {
        item.timestamp.format("%m-%d %H:%M").to_string()
    } else {
        item.timestamp.format("%H:%M").to_string()
    };

    write!(
        out,
        "<li><span class=\"when\">{}</span> · <strong class=\"source\">{}</strong> · ",
        when,
        encode_text(&item.source)
    )?;
    match safe_href(&item.link) {
        Some(href) => write!(
            out,
            "<a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(href),
            encode_text(&item.title)
        )?,
        None => write!(out, "<span class=\"title\">{}</span>", encode_text(&item.title))?,
    }
    if opts.show_summary {
        if let Some(summary) = &item.summary {
            write!(out, "<p class=\"summary\">{}</p>", encode_text(summary))?;
        }
    }
    writeln!(out, "</li>")
}

/// Only web links are rendered as anchors; `javascript:` and friends are not.
fn safe_href(link: &str) -> Option<&str> {
    let lower = link.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(link.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportWindow;
    use chrono::TimeZone;
    use chrono_tz::Asia::Seoul;

    fn window() -> ReportWindow {
        ReportWindow {
            start: Seoul.with_ymd_and_hms(2025, 5, 5, 22, 0, 0).unwrap(),
            end: Seoul.with_ymd_and_hms(2025, 5, 6, 6, 0, 0).unwrap(),
        }
    }

    fn opts() -> RenderOptions {
        RenderOptions {
            title: "Overnight Headlines".to_string(),
            show_date: false,
            show_summary: true,
        }
    }

    fn item(title: &str, link: &str, summary: Option<&str>) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            link: link.to_string(),
            source: "CNBC".to_string(),
            timestamp: Seoul.with_ymd_and_hms(2025, 5, 6, 5, 30, 0).unwrap(),
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn test_render_heading_and_window() {
        let report = Report {
            window: window(),
            feed_count: 6,
            items: vec![item("Fed Raises Rates", "https://example.com/fed?x=1", None)],
        };
        let html = render(&report, &opts()).unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("<h1>Overnight Headlines · 2025-05-06</h1>"));
        assert!(html.contains("Window: 2025-05-05 22:00 ~ 2025-05-06 06:00 Asia/Seoul · 6 feeds · 1 items"));
        assert!(html.contains("<span class=\"when\">05:30</span>"));
        assert!(html.contains("<strong class=\"source\">CNBC</strong>"));
        assert!(html.contains("<a href=\"https://example.com/fed?x=1\">Fed Raises Rates</a>"));
        assert!(!html.contains("class=\"empty\""));
    }

    #[test]
    fn test_render_escapes_untrusted_text() {
        let report = Report {
            window: window(),
            feed_count: 1,
            items: vec![item(
                "<script>alert(1)</script> & co",
                "https://example.com/a?x=\"><script>",
                Some("5 < 6 & \"quotes\""),
            )],
        };
        let html = render(&report, &opts()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; co"));
        assert!(html.contains("href=\"https://example.com/a?x=&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("<p class=\"summary\">5 &lt; 6 &amp; \"quotes\"</p>"));
    }

    #[test]
    fn test_render_refuses_non_web_links() {
        let report = Report {
            window: window(),
            feed_count: 1,
            items: vec![item("Click me", "javascript:alert(1)", None)],
        };
        let html = render(&report, &opts()).unwrap();
        assert!(!html.contains("href=\"javascript"));
        assert!(html.contains("<span class=\"title\">Click me</span>"));
    }

    #[test]
    fn test_render_optional_date_and_summary() {
        let report = Report {
            window: window(),
            feed_count: 1,
            items: vec![item("t", "https://example.com/a", Some("excerpt"))],
        };
        let html = render(
            &report,
            &RenderOptions {
                show_date: true,
                show_summary: false,
                ..opts()
            },
        )
        .unwrap();
        assert!(html.contains("<span class=\"when\">05-06 05:30</span>"));
        assert!(!html.contains("excerpt"));
    }

    #[test]
    fn test_render_empty_placeholder() {
        let report = Report {
            window: window(),
            feed_count: 3,
            items: vec![],
        };
        let html = render(&report, &opts()).unwrap();
        assert!(html.contains(
            "<li class=\"empty\">No items were collected between 2025-05-05 22:00 and 2025-05-06 06:00 (Asia/Seoul).</li>"
        ));
        assert_eq!(html.matches("<li").count(), 1);
    }

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href("https://example.com"), Some("https://example.com"));
        assert_eq!(safe_href("HTTP://EXAMPLE.com"), Some("HTTP://EXAMPLE.com"));
        assert_eq!(safe_href("javascript:alert(1)"), None);
        assert_eq!(safe_href("/relative/path"), None);
    }
}
