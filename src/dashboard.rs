//! Dashboard Controller
//!
//! Owns the per-session view state and runs the load sequence:
//! preferences first (so the threshold is right before anything gets
//! classified), then statistics, then validation and normalization.
//!
//! Loads are guarded against overlap, and every load carries a
//! sequence number so a stale response can never overwrite the result
//! of a newer one.

use chrono::{DateTime, NaiveDate, Utc};

use crate::chart::{self, TimelineSeries};
use crate::client::{LoadError, LoadResult, StatisticsProvider};
use crate::export::{self, ExportError};
use crate::model::{StatisticsPayload, StatusSummary, Warranty};
use crate::timeline::{self, TimelineBucket};
use crate::view::{filter_and_sort, SortColumn, StatusFilter, ViewState};

/// Fallback expiring-soon threshold when preferences are unavailable.
pub const DEFAULT_THRESHOLD_DAYS: i64 = 30;

/// Dashboard controller over a statistics provider.
pub struct Dashboard<P: StatisticsProvider> {
    provider: P,
    summary: StatusSummary,
    records: Vec<Warranty>,
    /// Owns the one expiring-soon threshold every classification uses;
    /// filter, sort, table, and export all read it from here
    view: ViewState,
    /// Models the disabled refresh control while a load is running
    loading: bool,
    /// Sequence of the most recently issued load
    issued_seq: u64,
    /// Sequence of the load whose result is currently applied
    applied_seq: u64,
    last_loaded: Option<DateTime<Utc>>,
}

impl<P: StatisticsProvider> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        let mut view = ViewState::default();
        view.threshold_days = DEFAULT_THRESHOLD_DAYS;
        Self {
            provider,
            summary: StatusSummary::default(),
            records: Vec::new(),
            view,
            loading: false,
            issued_seq: 0,
            applied_seq: 0,
            last_loaded: None,
        }
    }

    /// Override the fallback threshold used until preferences load.
    pub fn with_default_threshold(mut self, days: i64) -> Self {
        self.view.threshold_days = days;
        self
    }

    /// Run one load attempt.
    ///
    /// Returns [`LoadError::LoadInProgress`] when a load is already
    /// running; the caller keeps its refresh control disabled until the
    /// prior attempt reaches a terminal state. A bare `&mut Dashboard`
    /// cannot re-enter this method, so the guard only trips when the
    /// controller sits behind a shared handle (an `Arc<Mutex<_>>`
    /// driving a UI). The loading flag is cleared on every exit path of
    /// the attempt that owns it; a rejected attempt leaves it alone.
    pub async fn load(&mut self) -> LoadResult<()> {
        if self.loading {
            return Err(LoadError::LoadInProgress);
        }
        self.loading = true;
        self.issued_seq += 1;
        let seq = self.issued_seq;

        let result = self.load_inner(seq).await;

        // Unconditional cleanup, success or not
        self.loading = false;
        result
    }

    async fn load_inner(&mut self, seq: u64) -> LoadResult<()> {
        // Preferences first: the threshold must be settled before any
        // classification runs. Failure here is non-fatal. The value is
        // only held locally until the whole load commits, so a failed
        // or superseded load leaves the prior threshold untouched.
        let preferred_threshold = match self.provider.fetch_preferences().await {
            Ok(prefs) => prefs.expiring_soon_days,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Preferences unavailable, keeping threshold {}",
                    self.view.threshold_days
                );
                None
            }
        };

        let payload = self.provider.fetch_statistics().await?;
        self.apply_payload(seq, payload, preferred_threshold)
    }

    /// Apply a completed load, unless a newer one has been issued since.
    fn apply_payload(
        &mut self,
        seq: u64,
        payload: StatisticsPayload,
        preferred_threshold: Option<i64>,
    ) -> LoadResult<()> {
        if seq != self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "Discarding superseded load");
            return Err(LoadError::Superseded);
        }

        if let Some(days) = preferred_threshold {
            tracing::debug!(days, "Applying expiring-soon threshold from preferences");
            self.view.threshold_days = days;
        }
        self.summary = chart::build_summary(&payload);
        self.records = payload
            .records()
            .iter()
            .cloned()
            .map(Warranty::from_raw)
            .collect();
        self.applied_seq = seq;
        self.last_loaded = Some(Utc::now());

        tracing::info!(
            records = self.records.len(),
            total = self.summary.total,
            "Dashboard loaded"
        );
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn summary(&self) -> &StatusSummary {
        &self.summary
    }

    pub fn records(&self) -> &[Warranty] {
        &self.records
    }

    pub fn threshold_days(&self) -> i64 {
        self.view.threshold_days
    }

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.last_loaded
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.view.query = query.into();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.view.status_filter = filter;
    }

    /// Sort-header interaction: same column toggles direction.
    pub fn sort_by(&mut self, column: SortColumn) {
        self.view.sort.apply_click(column);
    }

    pub fn set_sort(&mut self, sort: crate::view::SortState) {
        self.view.sort = sort;
    }

    /// The filtered, sorted view of the record set.
    pub fn current_view(&self, now: DateTime<Utc>) -> Vec<&Warranty> {
        filter_and_sort(&self.records, &self.view, now)
    }

    /// Monthly expiration buckets over the full record set.
    pub fn timeline(&self) -> Vec<TimelineBucket> {
        timeline::aggregate(&self.records)
    }

    /// Chart-ready timeline series, with the empty-chart fallback.
    pub fn timeline_series(&self, today: NaiveDate) -> TimelineSeries {
        chart::timeline_series(&self.timeline(), today)
    }

    /// Disjoint doughnut buckets from the summary.
    pub fn doughnut_series(&self) -> [u64; 3] {
        chart::doughnut_series(&self.summary)
    }

    /// CSV of the current view; `None` when there is nothing to export.
    /// Derives from [`Self::current_view`], so the export always equals
    /// the table.
    pub fn export_csv(
        &self,
        now: DateTime<Utc>,
        date_format: &str,
    ) -> Result<Option<String>, ExportError> {
        let view = self.current_view(now);
        export::render_csv(&view, now, self.view.threshold_days, date_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Preferences;
    use crate::status::WarrantyStatus;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    /// In-memory provider double. The state handle stays with the test
    /// so responses can change between loads.
    #[derive(Default)]
    struct MockState {
        stats: serde_json::Value,
        preferences: Option<i64>,
        fail_preferences: bool,
        fail_stats: bool,
    }

    struct MockProvider {
        state: Arc<Mutex<MockState>>,
    }

    impl MockProvider {
        fn new(stats: serde_json::Value) -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState {
                    stats,
                    ..Default::default()
                })),
            }
        }

        fn handle(&self) -> Arc<Mutex<MockState>> {
            self.state.clone()
        }
    }

    #[async_trait]
    impl StatisticsProvider for MockProvider {
        async fn fetch_statistics(&self) -> LoadResult<StatisticsPayload> {
            let state = self.state.lock().unwrap();
            if state.fail_stats {
                return Err(LoadError::Transport {
                    status: Some(502),
                    message: "bad gateway".to_string(),
                });
            }
            let payload: StatisticsPayload = serde_json::from_value(state.stats.clone())
                .map_err(|e| LoadError::MalformedPayload(e.to_string()))?;
            payload.validate().map_err(LoadError::MalformedPayload)?;
            Ok(payload)
        }

        async fn fetch_preferences(&self) -> LoadResult<Preferences> {
            let state = self.state.lock().unwrap();
            if state.fail_preferences {
                return Err(LoadError::Transport {
                    status: Some(500),
                    message: "boom".to_string(),
                });
            }
            Ok(Preferences {
                expiring_soon_days: state.preferences,
            })
        }
    }

    fn drill_stats() -> serde_json::Value {
        serde_json::json!({
            "active": 5,
            "expired": 1,
            "expiring_soon": 1,
            "total": 6,
            "all_warranties": [{
                "product_name": "Drill",
                "purchase_date": "2023-01-01",
                "expiration_date": "2023-06-01"
            }]
        })
    }

    #[tokio::test]
    async fn test_end_to_end_expired_drill() {
        let mut dashboard = Dashboard::new(MockProvider::new(drill_stats()));
        dashboard.load().await.unwrap();

        assert_eq!(dashboard.summary().total, 6);
        assert_eq!(dashboard.doughnut_series(), [4, 1, 1]);

        let now = Utc.with_ymd_and_hms(2023, 8, 1, 0, 0, 0).unwrap();
        let view = dashboard.current_view(now);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].product_name, "Drill");

        let csv = dashboard.export_csv(now, "%m/%d/%Y").unwrap().unwrap();
        assert!(csv.contains("Drill"));
        assert!(csv.contains("Expired"));
    }

    #[tokio::test]
    async fn test_preferences_set_threshold_before_classification() {
        let provider = MockProvider::new(drill_stats());
        provider.state.lock().unwrap().preferences = Some(90);

        let mut dashboard = Dashboard::new(provider);
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.threshold_days(), 90);
        assert_eq!(dashboard.view_state().threshold_days, 90);
    }

    #[tokio::test]
    async fn test_preferences_failure_keeps_default() {
        let provider = MockProvider::new(drill_stats());
        provider.state.lock().unwrap().fail_preferences = true;

        let mut dashboard = Dashboard::new(provider);
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.threshold_days(), DEFAULT_THRESHOLD_DAYS);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_filter_and_export_consistent() {
        // One record ~56 days out: active under a 30-day threshold,
        // expiring under a 90-day one
        let stats = serde_json::json!({
            "active": 1,
            "expired": 0,
            "expiring_soon": 0,
            "total": 1,
            "all_warranties": [{"product_name": "Camera", "expiration_date": "2024-08-10"}]
        });
        let provider = MockProvider::new(stats);
        let state = provider.handle();
        state.lock().unwrap().fail_preferences = true;

        let mut dashboard = Dashboard::new(provider);
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.threshold_days(), DEFAULT_THRESHOLD_DAYS);

        // Refresh: preferences now answer 90 days but the statistics
        // fetch fails, so the whole load is discarded
        {
            let mut state = state.lock().unwrap();
            state.fail_preferences = false;
            state.preferences = Some(90);
            state.fail_stats = true;
        }
        let err = dashboard.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Transport { .. }));

        // One threshold everywhere after the failed refresh
        assert_eq!(dashboard.threshold_days(), DEFAULT_THRESHOLD_DAYS);
        assert_eq!(dashboard.view_state().threshold_days, DEFAULT_THRESHOLD_DAYS);

        // The record is active under that threshold, both for the
        // status filter and in the export
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        dashboard.set_status_filter(StatusFilter::Only(WarrantyStatus::Expiring));
        assert!(dashboard.current_view(now).is_empty());

        dashboard.set_status_filter(StatusFilter::All);
        let csv = dashboard.export_csv(now, "%m/%d/%Y").unwrap().unwrap();
        assert!(csv.contains("Camera,N/A,08/10/2024,Active"));
    }

    #[tokio::test]
    async fn test_successful_refresh_applies_new_threshold() {
        let provider = MockProvider::new(drill_stats());
        let state = provider.handle();

        let mut dashboard = Dashboard::new(provider);
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.threshold_days(), DEFAULT_THRESHOLD_DAYS);

        state.lock().unwrap().preferences = Some(60);
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.threshold_days(), 60);
        assert_eq!(dashboard.view_state().threshold_days, 60);
    }

    #[tokio::test]
    async fn test_missing_required_fields_is_terminal() {
        let stats = serde_json::json!({"total": 6});
        let mut dashboard = Dashboard::new(MockProvider::new(stats));

        let err = dashboard.load().await.unwrap_err();
        assert!(matches!(err, LoadError::MalformedPayload(_)));
        // Loading indicator cleared on the error path too
        assert!(!dashboard.is_loading());
        assert!(dashboard.records().is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mut dashboard = Dashboard::new(MockProvider::new(drill_stats()));
        dashboard.load().await.unwrap();
        let records_before = dashboard.records().to_vec();

        // A response from sequence 1 arriving after sequence 2 was issued
        dashboard.issued_seq = 2;
        let payload: StatisticsPayload =
            serde_json::from_value(serde_json::json!({"active": 0, "expired": 0})).unwrap();
        let err = dashboard.apply_payload(1, payload, Some(99)).unwrap_err();

        assert!(matches!(err, LoadError::Superseded));
        // The stale load leaves no trace: records, summary, and the
        // preference it carried are all discarded
        assert_eq!(dashboard.records(), records_before.as_slice());
        assert_eq!(dashboard.summary().total, 6);
        assert_eq!(dashboard.threshold_days(), DEFAULT_THRESHOLD_DAYS);
    }

    #[tokio::test]
    async fn test_guard_rejects_overlapping_load() {
        let mut dashboard = Dashboard::new(MockProvider::new(drill_stats()));

        // A load in flight behind a shared handle
        dashboard.loading = true;
        let err = dashboard.load().await.unwrap_err();
        assert!(matches!(err, LoadError::LoadInProgress));
        // The in-flight load owns the flag; the rejected attempt must
        // not clear it
        assert!(dashboard.is_loading());

        dashboard.loading = false;
        dashboard.load().await.unwrap();
        assert!(!dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_falls_back_to_recent_warranties() {
        let stats = serde_json::json!({
            "active": 1,
            "expired": 0,
            "recent_warranties": [{"product_name": "Kettle", "expiration_date": "2030-01-01"}]
        });
        let mut dashboard = Dashboard::new(MockProvider::new(stats));
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.records().len(), 1);
        assert_eq!(dashboard.records()[0].product_name, "Kettle");
    }

    #[tokio::test]
    async fn test_empty_timeline_gets_presentation_fallback() {
        let stats = serde_json::json!({"active": 0, "expired": 0});
        let mut dashboard = Dashboard::new(MockProvider::new(stats));
        dashboard.load().await.unwrap();

        assert!(dashboard.timeline().is_empty());
        let series =
            dashboard.timeline_series(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(series.labels.len(), 3);
        assert_eq!(series.counts, vec![0, 0, 0]);
    }
}
