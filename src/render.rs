//! Terminal Rendering Adapter
//!
//! The only module that formats view-model output for display. All
//! numbers, orderings, and status texts come from the pure builders;
//! nothing here makes a classification decision of its own.

use chrono::{DateTime, NaiveDate, Utc};

use crate::chart::{TimelineSeries, DOUGHNUT_LABELS};
use crate::model::{StatusSummary, Warranty};
use crate::status::{classify, days_until};

const BAR_WIDTH: usize = 40;

/// Summary counts line block.
pub fn render_summary(summary: &StatusSummary) -> String {
    format!(
        "Total: {}   Active: {}   Expiring Soon: {}   Expired: {}",
        summary.total, summary.active, summary.expiring_soon, summary.expired
    )
}

/// Status distribution as labeled proportional bars.
pub fn render_doughnut(series: &[u64; 3]) -> String {
    let max = series.iter().copied().max().unwrap_or(0);
    let mut out = String::from("Status Distribution\n");
    for (label, &count) in DOUGHNUT_LABELS.iter().zip(series.iter()) {
        out.push_str(&format!(
            "  {:<14} {:<width$} {}\n",
            label,
            bar(count, max),
            count,
            width = BAR_WIDTH
        ));
    }
    out
}

/// Monthly expiration counts as labeled bars.
pub fn render_timeline(series: &TimelineSeries) -> String {
    let max = series.counts.iter().copied().max().unwrap_or(0);
    let mut out = String::from("Warranties Expiring by Month\n");
    for (label, &count) in series.labels.iter().zip(series.counts.iter()) {
        out.push_str(&format!(
            "  {:<10} {:<width$} {}\n",
            label,
            bar(count, max),
            count,
            width = BAR_WIDTH
        ));
    }
    out
}

/// The filtered/sorted record table.
///
/// An empty view renders the no-match message instead of a bare header.
pub fn render_table(
    view: &[&Warranty],
    now: DateTime<Utc>,
    threshold_days: i64,
    date_format: &str,
) -> String {
    if view.is_empty() {
        return "No warranties match your search criteria.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<30} {:<14} {:<24} {}\n",
        "Product", "Purchase Date", "Expiration Date", "Status"
    ));
    out.push_str(&format!("{}\n", "-".repeat(84)));

    for record in view {
        let purchase = format_date(record.purchase_date, date_format);
        let (expiration, status) = match record.expiration_date {
            Some(date) => (
                format!("{} ({})", date.format(date_format), days_text(date, now)),
                classify(date, now, threshold_days).label(),
            ),
            None => ("N/A".to_string(), "Unknown"),
        };

        out.push_str(&format!(
            "{:<30} {:<14} {:<24} {}\n",
            record.product_name, purchase, expiration, status
        ));
    }

    out
}

/// "in N days" / "N days ago" / "today" annotation for the table.
fn days_text(expiration: NaiveDate, now: DateTime<Utc>) -> String {
    let days = days_until(expiration, now);
    if days > 0 {
        format!("in {} days", days)
    } else if days < 0 {
        format!("{} days ago", -days)
    } else {
        "today".to_string()
    }
}

fn format_date(date: Option<NaiveDate>, date_format: &str) -> String {
    match date {
        Some(d) => d.format(date_format).to_string(),
        None => "N/A".to_string(),
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawWarranty;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_line() {
        let summary = StatusSummary {
            total: 6,
            active: 5,
            expiring_soon: 1,
            expired: 1,
        };
        let line = render_summary(&summary);
        assert!(line.contains("Total: 6"));
        assert!(line.contains("Expiring Soon: 1"));
    }

    #[test]
    fn test_doughnut_has_all_labels() {
        let out = render_doughnut(&[4, 1, 1]);
        for label in DOUGHNUT_LABELS {
            assert!(out.contains(label));
        }
    }

    #[test]
    fn test_empty_table_message() {
        let out = render_table(&[], now(), 30, "%m/%d/%Y");
        assert!(out.contains("No warranties match"));
    }

    #[test]
    fn test_table_row_annotations() {
        let expired = Warranty::from_raw(RawWarranty {
            product_name: Some("Drill".to_string()),
            expiration_date: Some("2024-06-01".to_string()),
            ..Default::default()
        });
        let upcoming = Warranty::from_raw(RawWarranty {
            product_name: Some("Laptop".to_string()),
            expiration_date: Some("2024-06-20".to_string()),
            ..Default::default()
        });

        let out = render_table(&[&expired, &upcoming], now(), 30, "%m/%d/%Y");
        assert!(out.contains("Drill"));
        assert!(out.contains("days ago"));
        assert!(out.contains("in 5 days"));
        assert!(out.contains("Expired"));
        assert!(out.contains("Expiring Soon"));
    }

    #[test]
    fn test_zero_counts_render_empty_bars() {
        let out = render_timeline(&TimelineSeries {
            labels: vec!["Apr 2024".to_string()],
            counts: vec![0],
        });
        assert!(out.contains("Apr 2024"));
        assert!(!out.contains('#'));
    }
}
