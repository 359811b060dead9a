//! Summary & Chart Series Builders
//!
//! Turns the raw statistics payload into the shapes the rendering
//! adapter draws: the summary counts, the disjoint doughnut buckets,
//! and the labeled monthly-expiration series.

use chrono::{Datelike, NaiveDate};

use crate::model::{StatisticsPayload, StatusSummary};
use crate::timeline::TimelineBucket;

/// Build the summary counts by plain field defaulting.
///
/// The server counts over the full dataset while this side may only
/// hold a sample, so nothing is re-derived from the record list.
pub fn build_summary(payload: &StatisticsPayload) -> StatusSummary {
    StatusSummary {
        total: payload.total.unwrap_or(0),
        active: payload.active.unwrap_or(0),
        expiring_soon: payload.expiring_soon.unwrap_or(0),
        expired: payload.expired.unwrap_or(0),
    }
}

/// Disjoint doughnut buckets: (truly active, expiring soon, expired).
///
/// The server's `active` count includes the expiring-soon records, so
/// the first bucket subtracts them, saturating at zero.
pub fn doughnut_series(summary: &StatusSummary) -> [u64; 3] {
    [
        summary.active.saturating_sub(summary.expiring_soon),
        summary.expiring_soon,
        summary.expired,
    ]
}

pub const DOUGHNUT_LABELS: [&str; 3] = ["Active", "Expiring Soon", "Expired"];

/// Labeled series for the monthly-expiration bar chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSeries {
    /// "Mon YYYY" labels, one per bucket
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl TimelineSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build the chart series from the aggregated buckets.
///
/// An empty aggregate gets a trailing 3-month window of zero counts
/// anchored at `today`, so the chart is never blank. That window is a
/// presentation fallback only; the aggregate itself stays sparse.
pub fn timeline_series(buckets: &[TimelineBucket], today: NaiveDate) -> TimelineSeries {
    if buckets.is_empty() {
        let mut labels = Vec::with_capacity(3);
        for months_back in (0..3).rev() {
            let (year, month) = shift_month(today.year(), today.month(), -months_back);
            labels.push(month_label(year, month));
        }
        return TimelineSeries {
            labels,
            counts: vec![0; 3],
        };
    }

    TimelineSeries {
        labels: buckets
            .iter()
            .map(|b| month_label(b.year, b.month))
            .collect(),
        counts: buckets.iter().map(|b| b.count).collect(),
    }
}

/// Format a (year, month) pair as e.g. "Mar 2024".
fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => "Unknown".to_string(),
    }
}

/// Shift a (year, month) pair by a signed number of months.
fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + (month as i32 - 1) + delta;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(active: u64, expiring_soon: u64, expired: u64) -> StatusSummary {
        StatusSummary {
            total: active + expired,
            active,
            expiring_soon,
            expired,
        }
    }

    #[test]
    fn test_build_summary_defaults_missing_fields() {
        let payload: StatisticsPayload =
            serde_json::from_str(r#"{"active": 10, "expired": 2}"#).unwrap();
        let summary = build_summary(&payload);
        assert_eq!(summary.active, 10);
        assert_eq!(summary.expired, 2);
        assert_eq!(summary.expiring_soon, 0);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_doughnut_subtracts_expiring_from_active() {
        assert_eq!(doughnut_series(&summary(10, 3, 2)), [7, 3, 2]);
    }

    #[test]
    fn test_doughnut_never_negative() {
        assert_eq!(doughnut_series(&summary(2, 5, 0)), [0, 5, 0]);
    }

    #[test]
    fn test_timeline_series_labels() {
        let buckets = vec![
            TimelineBucket { year: 2024, month: 1, count: 1 },
            TimelineBucket { year: 2024, month: 3, count: 2 },
        ];
        let series = timeline_series(&buckets, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(series.labels, vec!["Jan 2024", "Mar 2024"]);
        assert_eq!(series.counts, vec![1, 2]);
    }

    #[test]
    fn test_empty_aggregate_gets_trailing_window() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let series = timeline_series(&[], today);
        // Window crosses the year boundary
        assert_eq!(series.labels, vec!["Dec 2023", "Jan 2024", "Feb 2024"]);
        assert_eq!(series.counts, vec![0, 0, 0]);
    }

    #[test]
    fn test_shift_month_wraps_years() {
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2024, 12, 1), (2025, 1));
        assert_eq!(shift_month(2024, 6, 0), (2024, 6));
        assert_eq!(shift_month(2024, 3, -26), (2022, 1));
    }
}
