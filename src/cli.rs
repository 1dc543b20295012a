//! Command-line interface definitions for the digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option is also settable from the YAML config file; values given on
//! the command line win.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one digest run.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./feeds.txt in, ./out out, Asia/Seoul 22:00-06:00
/// overnight_digest
///
/// # Explicit config plus overrides
/// overnight_digest -c digest.yaml -o /var/www/digest --max-items 60
///
/// # Rebuild a past digest
/// overnight_digest --now 2025-05-06T07:00:00+09:00
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Feed list file, one URL per line
    #[arg(short, long)]
    pub feeds: Option<PathBuf>,

    /// Output directory for the HTML files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// IANA timezone the window and timestamps are expressed in
    #[arg(long, env = "DIGEST_TIMEZONE")]
    pub timezone: Option<String>,

    /// Keep at most this many items (0 = unbounded)
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Filename of the always-current copy of the digest
    #[arg(long)]
    pub latest_name: Option<String>,

    /// Reference time (RFC 3339) used instead of the current time
    #[arg(long, value_parser = parse_reference_time)]
    pub now: Option<DateTime<Utc>>,
}

fn parse_reference_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["overnight_digest"]);
        assert!(cli.feeds.is_none());
        assert!(cli.output_dir.is_none());
        assert!(cli.max_items.is_none());
        assert!(cli.now.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "overnight_digest",
            "-c",
            "/etc/digest.yaml",
            "-f",
            "/tmp/feeds.txt",
            "-o",
            "/tmp/out",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/digest.yaml")));
        assert_eq!(cli.feeds, Some(PathBuf::from("/tmp/feeds.txt")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_cli_reference_time() {
        let cli = Cli::parse_from(["overnight_digest", "--now", "2025-05-06T07:00:00+09:00"]);
        assert_eq!(cli.now, Some(Utc.with_ymd_and_hms(2025, 5, 5, 22, 0, 0).unwrap()));
    }

    #[test]
    fn test_cli_rejects_bad_reference_time() {
        assert!(Cli::try_parse_from(["overnight_digest", "--now", "tomorrow"]).is_err());
    }

    #[test]
    fn test_cli_max_items() {
        let cli = Cli::parse_from(["overnight_digest", "--max-items", "60", "--latest-name", "index.html"]);
        assert_eq!(cli.max_items, Some(60));
        assert_eq!(cli.latest_name.as_deref(), Some("index.html"));
    }
}
