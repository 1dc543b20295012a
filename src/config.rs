//! Run configuration: YAML file, CLI overrides, defaults.
//!
//! ```yaml
//! timezone: Asia/Seoul
//! window:
//!   end: "06:00"
//!   start: "22:00"        # or: duration_hours: 24
//! max_items: 60
//! summary_chars: 600
//! show_summary: true
//! show_date: false
//! feeds_file: feeds.txt
//! output_dir: out
//! latest_name: daily.html
//! title: Overnight Headlines
//! fetch_timeout_secs: 20
//! ```

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tokio::fs;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::error::{DigestError, Result};
use crate::window::{WindowSpan, WindowSpec};

pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_WINDOW_END: &str = "06:00";
pub const DEFAULT_WINDOW_START: &str = "22:00";
pub const DEFAULT_SUMMARY_CHARS: usize = 600;
pub const DEFAULT_FEEDS_FILE: &str = "feeds.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_LATEST_NAME: &str = "daily.html";
pub const DEFAULT_TITLE: &str = "Overnight Headlines";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// The config file as written. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub timezone: Option<String>,
    pub window: WindowConfig,
    pub max_items: Option<usize>,
    pub summary_chars: Option<usize>,
    pub show_summary: Option<bool>,
    pub show_date: Option<bool>,
    pub feeds_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub latest_name: Option<String>,
    pub title: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    /// `HH:MM` the window closes at, on the run date.
    pub end: Option<String>,
    /// `HH:MM` the window opens at, before `end`.
    pub start: Option<String>,
    /// Window length; wins over `start` when both are set.
    pub duration_hours: Option<u32>,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tz: Tz,
    pub window: WindowSpec,
    /// 0 means unbounded.
    pub max_items: usize,
    /// `None` when summaries are switched off.
    pub summary_limit: Option<usize>,
    pub show_date: bool,
    pub feeds_file: PathBuf,
    pub output_dir: PathBuf,
    pub latest_name: String,
    pub title: String,
    pub fetch_timeout: StdDuration,
}

impl Settings {
    /// Read the config file named on the command line (if any) and merge
    /// the CLI overrides on top.
    ///
    /// # Errors
    ///
    /// A named config file that is missing or malformed, or any value that
    /// fails validation.
    #[instrument(level = "info", skip_all)]
    pub async fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => read_config(path).await?,
            None => FileConfig::default(),
        };
        let settings = Self::resolve(file, cli)?;
        info!(
            tz = %settings.tz,
            feeds_file = %settings.feeds_file.display(),
            output_dir = %settings.output_dir.display(),
            max_items = settings.max_items,
            "Loaded configuration"
        );
        Ok(settings)
    }

    /// Merge file values, CLI overrides and defaults, then validate.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self> {
        let tz_name = cli
            .timezone
            .clone()
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let tz: Tz = tz_name
            .parse()
            .map_err(|_| DigestError::Config(format!("unknown timezone: {}", tz_name)))?;

        let window = resolve_window(&file.window)?;

        let summary_chars = file.summary_chars.unwrap_or(DEFAULT_SUMMARY_CHARS);
        let summary_limit = match file.show_summary.unwrap_or(true) {
            true if summary_chars > 0 => Some(summary_chars),
            _ => None,
        };

        let latest_name = cli
            .latest_name
            .clone()
            .or(file.latest_name)
            .unwrap_or_else(|| DEFAULT_LATEST_NAME.to_string());
        if latest_name.trim().is_empty() || latest_name.contains(['/', '\\']) {
            return Err(DigestError::Config(format!(
                "latest_name must be a plain filename, got {:?}",
                latest_name
            )));
        }

        let timeout_secs = file.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(DigestError::Config("fetch_timeout_secs must be positive".to_string()));
        }

        Ok(Self {
            tz,
            window,
            max_items: cli.max_items.or(file.max_items).unwrap_or(0),
            summary_limit,
            show_date: file.show_date.unwrap_or(false),
            feeds_file: cli
                .feeds
                .clone()
                .or(file.feeds_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FEEDS_FILE)),
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            latest_name,
            title: file.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            fetch_timeout: StdDuration::from_secs(timeout_secs),
        })
    }
}

async fn read_config(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| DigestError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}

fn resolve_window(cfg: &WindowConfig) -> Result<WindowSpec> {
    let end = parse_time_of_day(cfg.end.as_deref().unwrap_or(DEFAULT_WINDOW_END))?;
    let span = match (cfg.duration_hours, cfg.start.as_deref()) {
        (Some(0), _) => {
            return Err(DigestError::Config("window.duration_hours must be positive".to_string()));
        }
        (Some(hours), _) => WindowSpan::Duration(Duration::hours(i64::from(hours))),
        (None, start) => WindowSpan::StartAt(parse_time_of_day(start.unwrap_or(DEFAULT_WINDOW_START))?),
    };
    Ok(WindowSpec { end, span })
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| DigestError::Config(format!("invalid time of day {:?}, expected HH:MM", s)))
}
