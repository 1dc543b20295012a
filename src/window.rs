//! Reporting window calculation.
//!
//! The window is anchored to the calendar date of "now" in the report
//! timezone, never to the exact run time: a run at 07:00 and one at 23:00 on
//! the same day produce the same `[start, end]`.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::models::ReportWindow;

/// How far back the window reaches from its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpan {
    /// Fixed length, e.g. 24 hours.
    Duration(Duration),
    /// Most recent occurrence of this wall-clock time before the end.
    StartAt(NaiveTime),
}

/// Window shape: an end time-of-day plus a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub end: NaiveTime,
    pub span: WindowSpan,
}

impl Default for WindowSpec {
    /// 22:00 the previous day through 06:00 today.
    fn default() -> Self {
        Self {
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            span: WindowSpan::StartAt(NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default()),
        }
    }
}

/// Compute the window for a run happening at `now`.
pub fn compute_window(spec: &WindowSpec, tz: Tz, now: DateTime<Utc>) -> ReportWindow {
    let today = now.with_timezone(&tz).date_naive();
    let end = localize(tz, today.and_time(spec.end));

    let start = match spec.span {
        WindowSpan::Duration(d) => end - d,
        WindowSpan::StartAt(t) => {
            let day = if t < spec.end {
                today
            } else {
                today.pred_opt().unwrap_or(today)
            };
            localize(tz, day.and_time(t))
        }
    };

    debug!(%start, %end, %tz, "Computed report window");
    ReportWindow { start, end }
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall in a gap (clocks going forward) are pushed past the gap.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt;
    }
    warn!(%naive, %tz, "Local time falls in a DST gap; shifting forward");
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Convert an instant into the report timezone.
pub fn to_report_tz<Z: TimeZone>(ts: &DateTime<Z>, tz: Tz) -> DateTime<Tz> {
    ts.with_timezone(&tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::Asia::Seoul;

    fn utc_for_seoul(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Seoul
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_default_window_is_overnight() {
        let w = compute_window(&WindowSpec::default(), Seoul, utc_for_seoul(2025, 5, 6, 7, 0));
        assert_eq!(w.start, Seoul.with_ymd_and_hms(2025, 5, 5, 22, 0, 0).unwrap());
        assert_eq!(w.end, Seoul.with_ymd_and_hms(2025, 5, 6, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_window_is_stable_within_a_day() {
        let spec = WindowSpec::default();
        let morning = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 0, 5));
        let noon = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 12, 0));
        let late = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 23, 59));
        assert_eq!(morning, noon);
        assert_eq!(noon, late);
    }

    #[test]
    fn test_window_uses_report_timezone_date() {
        // 2025-05-05 20:00 UTC is already 2025-05-06 05:00 in Seoul.
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 20, 0, 0).unwrap();
        let w = compute_window(&WindowSpec::default(), Seoul, now);
        assert_eq!(w.end_date(), chrono::NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
    }

    #[test]
    fn test_duration_window() {
        let spec = WindowSpec {
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            span: WindowSpan::Duration(Duration::hours(24)),
        };
        let w = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 9, 0));
        assert_eq!(w.start, Seoul.with_ymd_and_hms(2025, 5, 5, 6, 0, 0).unwrap());
        assert_eq!(w.end, Seoul.with_ymd_and_hms(2025, 5, 6, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_duration_longer_than_a_day() {
        let spec = WindowSpec {
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            span: WindowSpan::Duration(Duration::hours(72)),
        };
        let w = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 9, 0));
        assert_eq!(w.start, Seoul.with_ymd_and_hms(2025, 5, 3, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_start_before_end_same_day() {
        let spec = WindowSpec {
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            span: WindowSpan::StartAt(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        };
        let w = compute_window(&spec, Seoul, utc_for_seoul(2025, 5, 6, 9, 0));
        assert_eq!(w.start, Seoul.with_ymd_and_hms(2025, 5, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_gap_does_not_panic() {
        // 2025-03-09 02:30 does not exist in New York.
        let spec = WindowSpec {
            end: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
            span: WindowSpan::Duration(Duration::hours(8)),
        };
        let now = New_York
            .with_ymd_and_hms(2025, 3, 9, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let w = compute_window(&spec, New_York, now);
        assert_eq!(w.end, New_York.with_ymd_and_hms(2025, 3, 9, 3, 30, 0).unwrap());
        assert!(w.start < w.end);
    }

    #[test]
    fn test_dst_overlap_takes_earliest() {
        // 2025-11-02 01:30 happens twice in New York.
        let naive = chrono::NaiveDate::from_ymd_opt(2025, 11, 2)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let dt = localize(New_York, naive);
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_to_report_tz_is_idempotent() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 5, 21, 15, 0).unwrap();
        let once = to_report_tz(&ts, Seoul);
        let twice = to_report_tz(&once, Seoul);
        assert_eq!(once, twice);
        assert_eq!(once.to_rfc3339(), twice.to_rfc3339());
    }
}
