//! Page view-models.
//!
//! Each page module exposes `derive` (pure, raw payload -> view-model) and
//! `load` (fetch through a [`crate::api::Backend`], then derive). Both front
//! ends render the same view-models.

pub mod analytics;
pub mod chart;
pub mod detail;
pub mod format;
pub mod home;
pub mod reports;
pub mod state;

pub use analytics::AnalyticsView;
pub use detail::{HistoryPanel, ReportDetail};
pub use home::HomeView;
pub use reports::{ReportFilter, ReportRow, ReportsView, SortOrder};
pub use state::ViewState;
