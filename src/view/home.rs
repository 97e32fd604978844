//! Home page: headline stats and the most recent calls.

use serde::Serialize;

use super::chart::{self, SeriesPoint, StatCard};
use super::format::{self, RiskLevel};
use super::reports::{self, ReportRow, SortOrder};
use super::state::{self, ViewState};
use crate::api::{AnalyticsSummary, Backend, Report};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub cards: Vec<StatCard>,
    pub risk_breakdown: Vec<SeriesPoint>,
    pub recent: Vec<ReportRow>,
}

pub fn derive(summary: &AnalyticsSummary, reports: &[Report], recent_limit: usize) -> HomeView {
    // Prefer the server's distribution; fall back to bucketing the list.
    let high_risk = if summary.risk_distribution.is_empty() {
        reports
            .iter()
            .filter(|r| r.risk_level() == RiskLevel::High)
            .count() as u64
    } else {
        chart::bucket_count(&summary.risk_distribution, "high")
    };

    let cards = vec![
        StatCard::new("Total Calls", format_count(summary.total_calls)),
        StatCard::new("Avg Compliance", format::format_percent(summary.avg_compliance)),
        StatCard::new("High Risk Calls", format_count(high_risk))
            .colored(RiskLevel::High.color()),
        StatCard::new("Total Violations", format_count(summary.total_violations)),
    ];

    let mut recent: Vec<ReportRow> = reports.iter().map(ReportRow::from_report).collect();
    reports::sort_rows(&mut recent, SortOrder::Newest);
    recent.truncate(recent_limit);

    HomeView {
        cards,
        risk_breakdown: chart::risk_series(&summary.risk_distribution),
        recent,
    }
}

/// Fetch summary and reports together, then derive the page.
pub fn load<B: Backend + ?Sized>(backend: &B, recent_limit: usize) -> ViewState<HomeView> {
    let (summary, reports) = state::fetch_pair(|| backend.summary(), || backend.reports());
    state::settle_pair(summary, reports, |summary, reports| {
        derive(&summary, &reports, recent_limit)
    })
}

/// Thousands separators: `12345` -> `12,345`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
