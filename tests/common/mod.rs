//! In-memory [`Backend`] shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use callscope::api::{
    AnalyticsSummary, AnalyticsTrends, ApiError, Backend, ChatReply, QuerySuggestion, Report,
};

/// Canned responses plus a record of every call made.
#[derive(Default)]
pub struct FakeBackend {
    pub summary: Option<AnalyticsSummary>,
    pub trends: AnalyticsTrends,
    pub reports: Vec<Report>,
    pub history: Vec<Report>,
    pub answer: String,
    pub suggestions: Vec<QuerySuggestion>,
    pub csv: String,
    /// Resources that fail with a 500.
    pub failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            summary: Some(AnalyticsSummary::default()),
            answer: "All good.".to_string(),
            csv: "id,risk\nr1,10\n".to_string(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, resource: &'static str) -> Self {
        self.failing.insert(resource);
        self
    }

    /// Every call so far, e.g. `"history:c-1"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, resource: &'static str, arg: &str) -> Result<(), ApiError> {
        let entry = if arg.is_empty() {
            resource.to_string()
        } else {
            format!("{resource}:{arg}")
        };
        self.calls.lock().unwrap().push(entry);
        if self.failing.contains(resource) {
            return Err(ApiError::Status { status: 500 });
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    fn summary(&self) -> Result<Option<AnalyticsSummary>, ApiError> {
        self.record("summary", "")?;
        Ok(self.summary.clone())
    }

    fn trends(&self) -> Result<AnalyticsTrends, ApiError> {
        self.record("trends", "")?;
        Ok(self.trends.clone())
    }

    fn reports(&self) -> Result<Vec<Report>, ApiError> {
        self.record("reports", "")?;
        Ok(self.reports.clone())
    }

    fn report(&self, id: &str) -> Result<Option<Report>, ApiError> {
        self.record("report", id)?;
        match self.reports.iter().find(|r| r.id == id) {
            Some(report) => Ok(Some(report.clone())),
            None => Err(ApiError::NotFound(format!("report {id}"))),
        }
    }

    fn caller_history(&self, caller_id: &str) -> Result<Vec<Report>, ApiError> {
        self.record("history", caller_id)?;
        Ok(self.history.clone())
    }

    fn chat(&self, query: &str, _session_id: &str) -> Result<ChatReply, ApiError> {
        self.record("chat", query)?;
        Ok(ChatReply {
            answer: self.answer.clone(),
            data_context: None,
        })
    }

    fn suggestions(&self) -> Result<Vec<QuerySuggestion>, ApiError> {
        self.record("suggestions", "")?;
        Ok(self.suggestions.clone())
    }

    fn export_csv(&self) -> Result<String, ApiError> {
        self.record("export", "")?;
        Ok(self.csv.clone())
    }
}

pub fn report(id: &str, timestamp: &str, risk: f64) -> Report {
    Report {
        id: id.to_string(),
        filename: Some(format!("20240101_120000_{id}.wav")),
        timestamp: Some(timestamp.to_string()),
        risk_score: risk,
        ..Report::default()
    }
}

pub fn suggestion(text: &str) -> QuerySuggestion {
    QuerySuggestion {
        category: "general".to_string(),
        text: text.to_string(),
    }
}
