//! # Overnight Digest
//!
//! Builds a daily HTML digest of the headlines published overnight across a
//! list of RSS/Atom feeds.
//!
//! ## Features
//!
//! - Reads feed URLs from a plain text list
//! - Keeps entries published inside a fixed reporting window (by default
//!   22:00 the previous day through 06:00 today, Asia/Seoul)
//! - Removes the same story syndicated by several feeds
//! - Writes an escaped HTML page under a stable name and a dated name
//!
//! ## Usage
//!
//! ```sh
//! overnight_digest -f feeds.txt -o ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Loading**: read the feed list; a missing list is fatal
//! 2. **Windowing**: derive the report window from the calendar date
//! 3. **Collecting**: fetch feeds one by one, normalize and filter entries
//! 4. **Output**: dedupe, cap, render and write the HTML files

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collect;
mod config;
mod dedup;
mod error;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;
mod window;

use cli::Cli;
use config::Settings;
use feeds::HttpFetcher;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("overnight_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(&args).await?;
    let fetcher = HttpFetcher::new(settings.fetch_timeout)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let summary = pipeline::run(&settings, &fetcher, now).await?;
    println!("{}", summary.status_line());

    info!(
        elapsed = ?start_time.elapsed(),
        items = summary.count,
        "Execution complete"
    );
    Ok(())
}
