//! Timeline Aggregation
//!
//! Groups warranty expirations by calendar month for the bar chart.
//! The output is sparse: months with no expirations produce no bucket.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::model::Warranty;

/// Expiration count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBucket {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub count: u64,
}

/// Group records by (year, month) of expiration, ascending.
///
/// Records without a parsable expiration date are skipped. An empty
/// input yields an empty vec; the presentation fallback for empty
/// charts lives in the chart builder, not here.
pub fn aggregate(records: &[Warranty]) -> Vec<TimelineBucket> {
    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();

    for record in records {
        if let Some(expiration) = record.expiration_date {
            *counts
                .entry((expiration.year(), expiration.month()))
                .or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((year, month), count)| TimelineBucket { year, month, count })
        .collect()
}
