//! Status Classification
//!
//! Pure classification of a warranty's expiration date against a
//! reference instant and the expiring-soon threshold. Status is never
//! stored; it is recomputed at render and export time so a threshold
//! change takes effect without a data fetch.

use chrono::{DateTime, NaiveDate, Utc};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Derived warranty status.
///
/// Variant order doubles as the sort priority: ascending status sort
/// puts active warranties first and expired ones last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarrantyStatus {
    Active,
    Expiring,
    Expired,
}

impl WarrantyStatus {
    /// Sort priority: active=1, expiring=2, expired=3.
    pub fn priority(self) -> u8 {
        match self {
            WarrantyStatus::Active => 1,
            WarrantyStatus::Expiring => 2,
            WarrantyStatus::Expired => 3,
        }
    }

    /// Human-readable status text for the table and CSV export.
    pub fn label(self) -> &'static str {
        match self {
            WarrantyStatus::Active => "Active",
            WarrantyStatus::Expiring => "Expiring Soon",
            WarrantyStatus::Expired => "Expired",
        }
    }
}

/// An expiration date compares as midnight UTC of that calendar day.
fn expiration_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Whole days between `now` and the expiration instant, rounded up.
///
/// Positive for future expirations, zero or negative once expired; the
/// renderer uses the sign for its "in N days" / "N days ago" text.
pub fn days_until(expiration: NaiveDate, now: DateTime<Utc>) -> i64 {
    let secs = (expiration_instant(expiration) - now).num_seconds();
    if secs >= 0 {
        (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
    } else {
        // Integer division truncates toward zero, which is ceil here
        secs / SECS_PER_DAY
    }
}

/// Classify an expiration date against `now` and the threshold.
///
/// `expiration <= now` is expired; otherwise expiring when at most
/// `threshold_days` remain, else active. Callers with no parsable
/// expiration date must not classify at all.
pub fn classify(expiration: NaiveDate, now: DateTime<Utc>, threshold_days: i64) -> WarrantyStatus {
    if expiration_instant(expiration) <= now {
        WarrantyStatus::Expired
    } else if days_until(expiration, now) <= threshold_days {
        WarrantyStatus::Expiring
    } else {
        WarrantyStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_past_date_is_expired() {
        let now = instant(2024, 6, 15, 12);
        assert_eq!(classify(date(2024, 6, 1), now, 30), WarrantyStatus::Expired);
    }

    #[test]
    fn test_expiration_at_or_before_now_is_expired() {
        // Midnight of the expiration day is <= any instant that day
        let now = instant(2024, 6, 15, 0);
        assert_eq!(classify(date(2024, 6, 15), now, 30), WarrantyStatus::Expired);
        assert_eq!(
            classify(date(2024, 6, 15), instant(2024, 6, 15, 9), 30),
            WarrantyStatus::Expired
        );
    }

    #[test]
    fn test_within_threshold_is_expiring() {
        let now = instant(2024, 6, 15, 12);
        assert_eq!(classify(date(2024, 6, 16), now, 30), WarrantyStatus::Expiring);
        assert_eq!(classify(date(2024, 7, 15), now, 30), WarrantyStatus::Expiring);
    }

    #[test]
    fn test_beyond_threshold_is_active() {
        let now = instant(2024, 6, 15, 12);
        assert_eq!(classify(date(2024, 7, 16), now, 30), WarrantyStatus::Active);
        assert_eq!(classify(date(2030, 1, 1), now, 30), WarrantyStatus::Active);
    }

    #[test]
    fn test_threshold_boundary() {
        let now = instant(2024, 6, 15, 0);
        // Exactly 7 days remaining with a 7-day threshold
        assert_eq!(classify(date(2024, 6, 22), now, 7), WarrantyStatus::Expiring);
        assert_eq!(classify(date(2024, 6, 23), now, 7), WarrantyStatus::Active);
    }

    #[test]
    fn test_days_until_rounds_up() {
        // 12 hours remaining still counts as one day
        let now = instant(2024, 6, 15, 12);
        assert_eq!(days_until(date(2024, 6, 16), now), 1);
        assert_eq!(days_until(date(2024, 6, 17), now), 2);
    }

    #[test]
    fn test_days_until_past() {
        let now = instant(2024, 6, 15, 12);
        assert!(days_until(date(2024, 6, 10), now) < 0);
        assert_eq!(days_until(date(2024, 6, 15), now), 0);
    }

    #[test]
    fn test_priority_total_order() {
        assert!(WarrantyStatus::Active.priority() < WarrantyStatus::Expiring.priority());
        assert!(WarrantyStatus::Expiring.priority() < WarrantyStatus::Expired.priority());
        // Derived Ord agrees with priority
        assert!(WarrantyStatus::Active < WarrantyStatus::Expiring);
        assert!(WarrantyStatus::Expiring < WarrantyStatus::Expired);
    }

    #[test]
    fn test_labels() {
        assert_eq!(WarrantyStatus::Expiring.label(), "Expiring Soon");
        assert_eq!(WarrantyStatus::Expired.label(), "Expired");
        assert_eq!(WarrantyStatus::Active.label(), "Active");
    }
}
