//! Data Model
//!
//! Wire types for the statistics and preferences providers, plus the
//! normalized warranty record the view-model operates on.
//!
//! The statistics payload is consumed as given: the server computes the
//! aggregate counts over the full dataset, so the summary is never
//! re-derived from the record list on this side.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the server omits a product name
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Warranty record as it appears on the wire.
///
/// Every field is optional; normalization into [`Warranty`] fills the
/// gaps so downstream code never deals with missing names or ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWarranty {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub product_name: Option<String>,

    /// ISO date string, e.g. "2024-03-15"
    #[serde(default)]
    pub purchase_date: Option<String>,

    /// ISO date string; absent means the record carries no status
    #[serde(default)]
    pub expiration_date: Option<String>,

    #[serde(default)]
    pub invoice_path: Option<String>,
}

/// Normalized warranty record.
///
/// Dates are parsed once at normalization time; an unparsable date
/// behaves exactly like an absent one. A record without an expiration
/// date is excluded from status-bearing views, never guessed at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warranty {
    /// Server id, or a client-generated uuid (not stable across reloads)
    pub id: String,
    pub product_name: String,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Carried for completeness; unused by the view-model
    pub invoice_path: Option<String>,
}

impl Warranty {
    /// Normalize a wire record, backfilling id and product name.
    pub fn from_raw(raw: RawWarranty) -> Self {
        Self {
            id: raw
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            product_name: raw
                .product_name
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
            purchase_date: raw.purchase_date.as_deref().and_then(parse_date),
            expiration_date: raw.expiration_date.as_deref().and_then(parse_date),
            invoice_path: raw.invoice_path,
        }
    }
}

/// Parse a calendar date leniently.
///
/// The providers normally send plain ISO dates, but datetime strings
/// show up in older payloads, so a handful of common formats are tried
/// before giving up. `None` means the caller treats the date as absent.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    let date_formats = ["%m/%d/%Y", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    None
}

/// Aggregate counts as reported by the statistics provider.
///
/// `active` includes records also counted as `expiring_soon`; the
/// doughnut builder is responsible for splitting them apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: u64,
    pub active: u64,
    pub expiring_soon: u64,
    pub expired: u64,
}

/// Raw statistics payload from `GET /api/statistics`.
///
/// `active` and `expired` are required; everything else defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsPayload {
    #[serde(default)]
    pub active: Option<u64>,

    #[serde(default)]
    pub expired: Option<u64>,

    #[serde(default)]
    pub expiring_soon: Option<u64>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub recent_warranties: Vec<RawWarranty>,

    /// Preferred source for the full record set when present
    #[serde(default)]
    pub all_warranties: Option<Vec<RawWarranty>>,
}

impl StatisticsPayload {
    /// Check the required top-level counts are present.
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.active.is_none() {
            missing.push("active");
        }
        if self.expired.is_none() {
            missing.push("expired");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required fields: {}", missing.join(", ")))
        }
    }

    /// The record set to display: `all_warranties` when the server sent
    /// it, otherwise the recent-expirations sample.
    pub fn records(&self) -> &[RawWarranty] {
        match &self.all_warranties {
            Some(all) => all,
            None => &self.recent_warranties,
        }
    }
}

/// User preferences payload from `GET /api/auth/preferences`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub expiring_soon_days: Option<i64>,
}
