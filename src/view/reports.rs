//! Report list page: filter, search and sort.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::format::{self, RiskLevel};
use super::state::ViewState;
use crate::api::{Backend, Report};

/// One row of a report table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub date: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: &'static str,
    pub compliance: String,
    pub violations: usize,
    pub duration: String,
    #[serde(skip)]
    sort_key: Option<chrono::NaiveDateTime>,
}

impl ReportRow {
    pub fn from_report(report: &Report) -> Self {
        let level = report.risk_level();
        let timestamp = report.timestamp.as_deref().unwrap_or_default();
        Self {
            id: report.id.clone(),
            title: report.title(),
            filename: report.display_filename().to_string(),
            date: if timestamp.is_empty() {
                format::MISSING.to_string()
            } else {
                format::format_date(timestamp)
            },
            risk_score: report.risk_score,
            risk_level: level,
            risk_color: level.color(),
            compliance: format::format_percent(report.compliance_score),
            violations: report.violations.len(),
            duration: format::format_minutes(report.duration_seconds),
            sort_key: format::parse_timestamp(timestamp),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter and sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    RiskDesc,
    RiskAsc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" | "date_desc" => Some(Self::Newest),
            "oldest" | "date_asc" => Some(Self::Oldest),
            "risk" | "risk_desc" | "highest_risk" => Some(Self::RiskDesc),
            "risk_asc" | "lowest_risk" => Some(Self::RiskAsc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
            Self::RiskDesc => write!(f, "risk_desc"),
            Self::RiskAsc => write!(f, "risk_asc"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportFilter {
    pub risk: Option<RiskLevel>,
    pub search: String,
    pub sort: SortOrder,
}

impl ReportFilter {
    fn matches(&self, row: &ReportRow) -> bool {
        if let Some(risk) = self.risk
            && row.risk_level != risk
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&row.title, &row.filename, &row.id]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Sort rows in place. Rows without a parseable date sort last by date.
pub fn sort_rows(rows: &mut [ReportRow], order: SortOrder) {
    match order {
        SortOrder::Newest => rows.sort_by(|a, b| by_date(a, b, true)),
        SortOrder::Oldest => rows.sort_by(|a, b| by_date(a, b, false)),
        SortOrder::RiskDesc => rows.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score)),
        SortOrder::RiskAsc => rows.sort_by(|a, b| a.risk_score.total_cmp(&b.risk_score)),
    }
}

fn by_date(a: &ReportRow, b: &ReportRow, newest_first: bool) -> Ordering {
    match (a.sort_key, b.sort_key) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportsView {
    pub filter: ReportFilter,
    /// Reports returned by the service before filtering.
    pub total: usize,
    pub rows: Vec<ReportRow>,
}

/// Derive the list page from raw reports.
pub fn derive(reports: &[Report], filter: &ReportFilter) -> ReportsView {
    let mut rows: Vec<ReportRow> = reports
        .iter()
        .map(ReportRow::from_report)
        .filter(|row| filter.matches(row))
        .collect();
    sort_rows(&mut rows, filter.sort);
    ReportsView {
        filter: filter.clone(),
        total: reports.len(),
        rows,
    }
}

/// Fetch and derive the report list page.
pub fn load<B: Backend + ?Sized>(backend: &B, filter: &ReportFilter) -> ViewState<ReportsView> {
    match backend.reports() {
        Ok(reports) => ViewState::Ready(derive(&reports, filter)),
        Err(e) => ViewState::failed(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: &str, ts: Option<&str>, risk: f64, filename: &str) -> Report {
        Report {
            id: id.to_string(),
            timestamp: ts.map(str::to_string),
            risk_score: risk,
            filename: Some(filename.to_string()),
            ..Report::default()
        }
    }

    fn sample() -> Vec<Report> {
        vec![
            report("a", Some("2024-01-02T10:00:00Z"), 20.0, "20240102_100000_billing_query.wav"),
            report("b", Some("2024-01-05T10:00:00Z"), 80.0, "20240105_100000_loan_dispute.wav"),
            report("c", None, 50.0, "482913.wav"),
            report("d", Some("2024-01-03T10:00:00Z"), 66.0, "collections_call.mp3"),
        ]
    }

    fn ids(view: &ReportsView) -> Vec<&str> {
        view.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn newest_first_with_undated_last() {
        let view = derive(&sample(), &ReportFilter::default());
        assert_eq!(ids(&view), ["b", "d", "a", "c"]);
    }

    #[test]
    fn oldest_first() {
        let filter = ReportFilter {
            sort: SortOrder::Oldest,
            ..ReportFilter::default()
        };
        assert_eq!(ids(&derive(&sample(), &filter)), ["a", "d", "b", "c"]);
    }

    #[test]
    fn risk_sorts() {
        let mut filter = ReportFilter {
            sort: SortOrder::RiskDesc,
            ..ReportFilter::default()
        };
        assert_eq!(ids(&derive(&sample(), &filter)), ["b", "d", "c", "a"]);
        filter.sort = SortOrder::RiskAsc;
        assert_eq!(ids(&derive(&sample(), &filter)), ["a", "c", "d", "b"]);
    }

    #[test]
    fn filter_by_risk_level() {
        let filter = ReportFilter {
            risk: Some(RiskLevel::High),
            ..ReportFilter::default()
        };
        let view = derive(&sample(), &filter);
        assert_eq!(ids(&view), ["b", "d"]);
        assert_eq!(view.total, 4);
    }

    #[test]
    fn search_matches_title_filename_and_id() {
        let mut filter = ReportFilter {
            search: "LOAN".to_string(),
            ..ReportFilter::default()
        };
        assert_eq!(ids(&derive(&sample(), &filter)), ["b"]);
        filter.search = "482913".to_string();
        assert_eq!(ids(&derive(&sample(), &filter)), ["c"]);
        filter.search = "  ".to_string();
        assert_eq!(derive(&sample(), &filter).rows.len(), 4);
    }

    #[test]
    fn sort_order_parse() {
        assert_eq!(SortOrder::parse("risk-desc"), Some(SortOrder::RiskDesc));
        assert_eq!(SortOrder::parse("Oldest"), Some(SortOrder::Oldest));
        assert_eq!(SortOrder::parse("random"), None);
    }

    #[test]
    fn row_formats_fields() {
        let mut r = report("x", Some("2024-01-05T14:30:00Z"), 40.0, "20240105_143000_refund.wav");
        r.compliance_score = Some(87.4);
        let row = ReportRow::from_report(&r);
        assert_eq!(row.title, "refund");
        assert_eq!(row.date, "Jan 05, 2024 14:30");
        assert_eq!(row.risk_level, RiskLevel::Medium);
        assert_eq!(row.compliance, "87%");
        assert_eq!(row.duration, format::MISSING);
    }
}
