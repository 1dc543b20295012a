//! Writing the rendered digest to disk.
//!
//! Each run writes the same document twice:
//! ```text
//! output_dir/
//! ├── daily.html        # latest digest, overwritten every run
//! └── 2025-05-06.html   # keyed by the window end date
//! ```

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;

/// Where a run's two output files ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub latest: PathBuf,
    pub dated: PathBuf,
}

/// `YYYY-MM-DD.html` for the given window end date.
pub fn dated_filename(date: NaiveDate) -> String {
    format!("{}.html", date.format("%Y-%m-%d"))
}

/// Write `html` to the "latest" file and to the dated file.
///
/// Creates `output_dir` if needed. Existing files are overwritten, so
/// repeating a run on the same date replaces that date's digest.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %date))]
pub async fn write_report(
    output_dir: &Path,
    latest_name: &str,
    date: NaiveDate,
    html: &str,
) -> Result<ReportPaths> {
    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let paths = ReportPaths {
        latest: output_dir.join(latest_name),
        dated: output_dir.join(dated_filename(date)),
    };

    for path in [&paths.latest, &paths.dated] {
        fs::write(path, html).await?;
        info!(path = %path.display(), bytes = html.len(), "Wrote digest");
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        assert_eq!(dated_filename(date), "2025-05-06.html");
    }

    #[tokio::test]
    async fn test_write_report_creates_dir_and_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("out");
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let paths = write_report(&out, "daily.html", date, "<p>hi</p>").await.unwrap();

        assert_eq!(paths.latest, out.join("daily.html"));
        assert_eq!(paths.dated, out.join("2025-05-06.html"));
        assert_eq!(std::fs::read_to_string(&paths.latest).unwrap(), "<p>hi</p>");
        assert_eq!(std::fs::read_to_string(&paths.dated).unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_write_report_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        write_report(tmp.path(), "daily.html", date, "first").await.unwrap();
        let paths = write_report(tmp.path(), "daily.html", date, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&paths.latest).unwrap(), "second");
        assert_eq!(std::fs::read_to_string(&paths.dated).unwrap(), "second");
    }
}
