//! Filter/Sort Engine
//!
//! Pure transformation of the full record set into the displayed
//! subset. The table renderer and the CSV exporter both consume
//! [`filter_and_sort`], so what is on screen and what gets exported can
//! never diverge.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Warranty;
use crate::status::{classify, WarrantyStatus};

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Product,
    Purchase,
    Expiration,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Current sort configuration. Session-scoped: survives filter changes,
/// not reloads of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Expiration,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Header-click semantics: same column toggles direction, a new
    /// column starts ascending.
    pub fn apply_click(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = SortDirection::Asc;
        }
    }
}

/// Status filter selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(WarrantyStatus),
}

/// The in-session view configuration: filter text, status filter, sort
/// state, and the expiring-soon threshold the classifications use.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub query: String,
    pub status_filter: StatusFilter,
    pub sort: SortState,
    pub threshold_days: i64,
}

/// Filter and sort the record set for display or export.
///
/// `now` is captured once for the whole pass so every status comparison
/// uses the same reference instant. The sort is `slice::sort_by`, which
/// is stable; ties keep their filtered order.
pub fn filter_and_sort<'a>(
    records: &'a [Warranty],
    view: &ViewState,
    now: DateTime<Utc>,
) -> Vec<&'a Warranty> {
    let query = view.query.to_lowercase();

    let mut matched: Vec<&Warranty> = records
        .iter()
        .filter(|record| {
            matches_query(record, &query) && matches_status(record, view, now)
        })
        .collect();

    matched.sort_by(|a, b| {
        let ordering = match view.sort.column {
            SortColumn::Product => a.product_name.cmp(&b.product_name),
            SortColumn::Purchase => purchase_key(a).cmp(&purchase_key(b)),
            SortColumn::Expiration => expiration_key(a).cmp(&expiration_key(b)),
            SortColumn::Status => {
                status_key(a, now, view.threshold_days).cmp(&status_key(b, now, view.threshold_days))
            }
        };
        match view.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    matched
}

fn matches_query(record: &Warranty, query: &str) -> bool {
    query.is_empty() || record.product_name.to_lowercase().contains(query)
}

fn matches_status(record: &Warranty, view: &ViewState, now: DateTime<Utc>) -> bool {
    match view.status_filter {
        StatusFilter::All => true,
        // Unclassifiable records never match a concrete status
        StatusFilter::Only(wanted) => record
            .expiration_date
            .map(|expiration| classify(expiration, now, view.threshold_days) == wanted)
            .unwrap_or(false),
    }
}

fn purchase_key(record: &Warranty) -> NaiveDate {
    record.purchase_date.unwrap_or(NaiveDate::MIN)
}

fn expiration_key(record: &Warranty) -> NaiveDate {
    record.expiration_date.unwrap_or(NaiveDate::MIN)
}

/// Status sort key; records without an expiration date sort before
/// every classified status.
fn status_key(record: &Warranty, now: DateTime<Utc>, threshold_days: i64) -> u8 {
    record
        .expiration_date
        .map(|expiration| classify(expiration, now, threshold_days).priority())
        .unwrap_or(0)
}
