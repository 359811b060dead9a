//! CSV Export
//!
//! Renders the current filtered/sorted view as CSV. The rows come from
//! the same view function that feeds the table, so the export always
//! matches what is on screen.

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Warranty;
use crate::status::classify;

/// Default download filename for the export.
pub const EXPORT_FILENAME: &str = "warranty_status_export.csv";

/// MIME type for callers serving the export over HTTP.
pub const CSV_MIME: &str = "text/csv; charset=utf-8";

/// Column headers, always present even for a single-row export.
pub const CSV_HEADER: [&str; 4] = ["Product", "Purchase Date", "Expiration Date", "Status"];

/// Errors from rendering or writing the export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the view as CSV text.
///
/// Returns `Ok(None)` for an empty view: no export side effect happens
/// and the caller surfaces a warning instead of a hard error. Product
/// names containing commas (or quotes) are quoted by the writer; dates
/// use `date_format`, with "N/A" for missing purchase dates. Status
/// text uses the export-time `now`.
pub fn render_csv(
    view: &[&Warranty],
    now: DateTime<Utc>,
    threshold_days: i64,
    date_format: &str,
) -> Result<Option<String>, ExportError> {
    if view.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in view {
        let status = match record.expiration_date {
            Some(expiration) => classify(expiration, now, threshold_days).label(),
            None => "Unknown",
        };
        writer.write_record([
            record.product_name.as_str(),
            &format_date(record.purchase_date, date_format),
            &format_date(record.expiration_date, date_format),
            status,
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })?;
    // The writer only ever receives UTF-8 input
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Write the rendered CSV to `path`, returning the number of data rows,
/// or `Ok(None)` when the view was empty and nothing was written.
pub fn write_csv(
    view: &[&Warranty],
    path: &Path,
    now: DateTime<Utc>,
    threshold_days: i64,
    date_format: &str,
) -> Result<Option<usize>, ExportError> {
    match render_csv(view, now, threshold_days, date_format)? {
        Some(text) => {
            std::fs::write(path, text)?;
            tracing::info!(path = ?path, rows = view.len(), "Exported warranty data");
            Ok(Some(view.len()))
        }
        None => Ok(None),
    }
}

fn format_date(date: Option<chrono::NaiveDate>, date_format: &str) -> String {
    match date {
        Some(d) => d.format(date_format).to_string(),
        None => "N/A".to_string(),
    }
}
