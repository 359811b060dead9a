//! # Warden
//!
//! Warranty status dashboard - fetches aggregate warranty statistics
//! from a REST service, classifies expirations, and drives charts, a
//! filterable/sortable table, and CSV export.
//!
//! ## Modules
//!
//! - [`status`]: pure expiration-date classification
//! - [`timeline`]: monthly expiration aggregation
//! - [`view`]: filter/sort engine over the record set
//! - [`chart`]: summary and chart series builders
//! - [`export`]: CSV export of the current view
//! - [`client`]: authenticated statistics/preferences providers
//! - [`dashboard`]: controller owning the load sequence and view state
//! - [`render`]: terminal rendering adapter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::client::{HttpProvider, ProviderConfig, StaticTokenAuth};
//! use warden::dashboard::Dashboard;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = StaticTokenAuth::new(std::env::var("WARDEN_API_TOKEN").ok());
//!     let provider = HttpProvider::new(ProviderConfig::default(), Some(Box::new(auth)));
//!
//!     let mut dashboard = Dashboard::new(provider);
//!     dashboard.load().await?;
//!
//!     let now = chrono::Utc::now();
//!     for warranty in dashboard.current_view(now) {
//!         println!("{}", warranty.product_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod model;
pub mod render;
pub mod status;
pub mod timeline;
pub mod view;

// Re-export top-level types for convenience
pub use chart::{build_summary, doughnut_series, timeline_series, TimelineSeries};
pub use client::{
    HttpProvider, LoadError, LoadResult, ProviderConfig, StaticTokenAuth, StatisticsProvider,
    TokenAuth,
};
pub use config::{Config, ConfigError, ConfigSource};
pub use dashboard::{Dashboard, DEFAULT_THRESHOLD_DAYS};
pub use export::{ExportError, CSV_MIME, EXPORT_FILENAME};
pub use model::{Preferences, RawWarranty, StatisticsPayload, StatusSummary, Warranty};
pub use status::{classify, days_until, WarrantyStatus};
pub use timeline::{aggregate, TimelineBucket};
pub use view::{filter_and_sort, SortColumn, SortDirection, SortState, StatusFilter, ViewState};
