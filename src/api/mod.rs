//! Data-fetch layer for the remote call-analysis service.
//!
//! [`Backend`] is the seam every page and the chat session fetch through.
//! [`client::ApiClient`] implements it over HTTP; tests substitute an
//! in-memory fake.

pub mod client;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    AnalyticsSummary, AnalyticsTrends, ChatReply, Obligation, QuerySuggestion, Report, Segment,
    Severity, StressPoint, TrendPoint, Violation,
};

/// One method per remote resource.
///
/// `Sync` so a page can issue two fetches from scoped threads at once.
pub trait Backend: Sync {
    /// Aggregate analytics. `Ok(None)` when the server answers with no payload.
    fn summary(&self) -> Result<Option<AnalyticsSummary>, ApiError>;

    fn trends(&self) -> Result<AnalyticsTrends, ApiError>;

    fn reports(&self) -> Result<Vec<Report>, ApiError>;

    /// A single report. `Ok(None)` when the server answers with no payload.
    fn report(&self, id: &str) -> Result<Option<Report>, ApiError>;

    /// Past reports for the caller identified by `caller_id`.
    fn caller_history(&self, caller_id: &str) -> Result<Vec<Report>, ApiError>;

    fn chat(&self, query: &str, session_id: &str) -> Result<ChatReply, ApiError>;

    fn suggestions(&self) -> Result<Vec<QuerySuggestion>, ApiError>;

    /// Raw CSV export of all reports.
    fn export_csv(&self) -> Result<String, ApiError>;
}
