/// Wire types for the call-analysis API.
///
/// Every field is optional on the wire. Absent values fall back to a default
/// instead of failing the whole decode, so a report with a missing filename
/// or risk level still renders.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::view::format::{self, RiskLevel};

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any casing of a known bucket. Anything else, including non-string
/// values, decodes as `None` so the score bucket takes over.
fn lenient_risk_level<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(RiskLevel::parse))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A single analyzed call recording and its derived findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: String,
    pub filename: Option<String>,
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub risk_score: f64,
    /// Server-assigned bucket. Use [`Report::risk_level`] for display.
    #[serde(deserialize_with = "lenient_risk_level")]
    pub risk_level: Option<RiskLevel>,
    #[serde(deserialize_with = "null_as_default")]
    pub violations: Vec<Violation>,
    #[serde(deserialize_with = "null_as_default")]
    pub obligations: Vec<Obligation>,
    #[serde(deserialize_with = "null_as_default")]
    pub agent_segments: Vec<Segment>,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_segments: Vec<Segment>,
    #[serde(deserialize_with = "null_as_default")]
    pub stress_timeline: Vec<StressPoint>,
    pub caller_id: Option<String>,
    pub compliance_score: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub intent: Option<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pii_count: usize,
    pub language: Option<String>,
}

impl Report {
    /// Effective risk level: the server's value, or bucketed from the score.
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
            .unwrap_or_else(|| format::risk_bucket(self.risk_score))
    }

    /// Filename for display, `"Unknown Call"` when absent.
    pub fn display_filename(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unknown Call",
        }
    }

    /// Human-readable title derived from the filename.
    pub fn title(&self) -> String {
        match self.filename.as_deref() {
            Some(name) if !name.trim().is_empty() => format::call_title(name),
            _ => "Unknown Call".to_string(),
        }
    }
}

/// Severity attached to a violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(|v| v.as_str())
            .map(Severity::parse)
            .unwrap_or_default())
    }
}

impl Severity {
    /// Case-insensitive; unrecognized labels are `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" | "med" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Sort weight, highest first when sorted descending.
    pub fn weight(self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unknown => 0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A detected policy or compliance breach within a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Violation {
    #[serde(alias = "type")]
    pub rule: String,
    pub severity: Severity,
    pub description: String,
    pub quote: Option<String>,
    pub timestamp: Option<f64>,
}

/// A disclosure or required statement tracked per report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Obligation {
    #[serde(alias = "text")]
    pub sentence: String,
    pub keywords: Vec<String>,
    pub fulfilled: Option<bool>,
}

/// One transcript segment attributed to a speaker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub stress: Option<f64>,
}

/// A sample from the per-call stress timeline.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StressPoint {
    pub time: f64,
    pub stress: f64,
}

/// Report list payload. The server may send a bare array or a wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReportList {
    Bare(Vec<Report>),
    Wrapped { reports: Vec<Report> },
}

impl ReportList {
    pub(crate) fn into_vec(self) -> Vec<Report> {
        match self {
            Self::Bare(reports) | Self::Wrapped { reports } => reports,
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Aggregate counts, distributions and scalar stats across all calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub total_calls: u64,
    pub total_violations: u64,
    pub risk_distribution: BTreeMap<String, u64>,
    pub intent_distribution: BTreeMap<String, u64>,
    pub compliance_distribution: BTreeMap<String, u64>,
    pub avg_compliance: Option<f64>,
    pub min_compliance: Option<f64>,
    pub max_compliance: Option<f64>,
    pub avg_risk: Option<f64>,
    pub avg_duration_seconds: Option<f64>,
    pub total_duration_seconds: Option<f64>,
}

/// Ordered per-call data points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsTrends {
    #[serde(alias = "points")]
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    pub report_id: Option<String>,
    pub timestamp: Option<String>,
    pub filename: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub compliance_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub risk_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub violation_count: u32,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Request body for the chat query endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ChatQuery<'a> {
    pub query: &'a str,
    pub session_id: &'a str,
}

/// Assistant reply to a chat query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    #[serde(alias = "response")]
    pub answer: String,
    pub data_context: Option<String>,
}

/// A canned prompt used to seed chat quick-replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySuggestion {
    pub category: String,
    #[serde(alias = "query")]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SuggestionList {
    Bare(Vec<QuerySuggestion>),
    Wrapped { suggestions: Vec<QuerySuggestion> },
}

impl SuggestionList {
    pub(crate) fn into_vec(self) -> Vec<QuerySuggestion> {
        match self {
            Self::Bare(items) | Self::Wrapped { suggestions: items } => items,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults_missing_fields() {
        let report: Report = serde_json::from_str(r#"{"id": "r1", "risk_score": 72}"#).unwrap();
        assert_eq!(report.id, "r1");
        assert!(report.violations.is_empty());
        assert_eq!(report.display_filename(), "Unknown Call");
        assert_eq!(report.title(), "Unknown Call");
        assert_eq!(report.risk_level(), RiskLevel::High);
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let report: Report = serde_json::from_str(
            r#"{"id": "r3", "risk_score": null, "violations": null, "filename": null}"#,
        )
        .unwrap();
        assert_eq!(report.risk_score, 0.0);
        assert!(report.violations.is_empty());
        assert_eq!(report.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn unrecognized_risk_level_falls_back_to_score() {
        for raw in [r#""unknown""#, r#""""#, "7", "null"] {
            let json = format!(r#"{{"id": "r4", "risk_score": 50, "risk_level": {raw}}}"#);
            let report: Report = serde_json::from_str(&json).unwrap();
            assert_eq!(report.risk_level, None, "risk_level {raw}");
            assert_eq!(report.risk_level(), RiskLevel::Medium);
        }
    }

    #[test]
    fn one_malformed_risk_level_does_not_sink_the_list() {
        let list: ReportList = serde_json::from_str(
            r#"[{"id": "a", "risk_level": "High"}, {"id": "b", "risk_score": 80, "risk_level": ""}]"#,
        )
        .unwrap();
        let reports = list.into_vec();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].risk_level(), RiskLevel::High);
        assert_eq!(reports[1].risk_level(), RiskLevel::High);
    }

    #[test]
    fn severity_decodes_any_case() {
        let violations: Vec<Violation> = serde_json::from_str(
            r#"[{"severity": "High"}, {"severity": "CRITICAL"}, {"severity": "weird"}, {"severity": null}, {}]"#,
        )
        .unwrap();
        let severities: Vec<Severity> = violations.iter().map(|v| v.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::High,
                Severity::Critical,
                Severity::Unknown,
                Severity::Unknown,
                Severity::Unknown
            ]
        );
    }

    #[test]
    fn explicit_risk_level_wins_over_score() {
        let report: Report =
            serde_json::from_str(r#"{"id": "r2", "risk_score": 90, "risk_level": "low"}"#).unwrap();
        assert_eq!(report.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn violation_accepts_type_alias_and_unknown_severity() {
        let v: Violation = serde_json::from_str(
            r#"{"type": "pressure_tactic", "severity": "severe", "description": "x"}"#,
        )
        .unwrap();
        assert_eq!(v.rule, "pressure_tactic");
        assert_eq!(v.severity, Severity::Unknown);
    }

    #[test]
    fn obligation_accepts_text_alias() {
        let o: Obligation =
            serde_json::from_str(r#"{"text": "You must pay by Friday", "keywords": ["must"]}"#)
                .unwrap();
        assert_eq!(o.sentence, "You must pay by Friday");
        assert_eq!(o.keywords, vec!["must"]);
    }

    #[test]
    fn report_list_accepts_both_shapes() {
        let bare: ReportList = serde_json::from_str(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 2);

        let wrapped: ReportList = serde_json::from_str(r#"{"reports": [{"id": "a"}]}"#).unwrap();
        assert_eq!(wrapped.into_vec()[0].id, "a");
    }

    #[test]
    fn chat_reply_accepts_response_alias() {
        let reply: ChatReply = serde_json::from_str(r#"{"response": "Hello"}"#).unwrap();
        assert_eq!(reply.answer, "Hello");
        assert!(reply.data_context.is_none());
    }

    #[test]
    fn suggestions_accept_query_alias() {
        let list: SuggestionList =
            serde_json::from_str(r#"{"suggestions": [{"category": "risk", "query": "Top risks?"}]}"#)
                .unwrap();
        let items = list.into_vec();
        assert_eq!(items[0].text, "Top risks?");
    }

    #[test]
    fn severity_orders_by_weight() {
        assert!(Severity::Critical.weight() > Severity::High.weight());
        assert!(Severity::High.weight() > Severity::Medium.weight());
        assert!(Severity::Low.weight() > Severity::Unknown.weight());
    }
}
