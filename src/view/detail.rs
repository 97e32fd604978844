//! Report detail page and the on-demand caller history panel.

use serde::Serialize;

use super::format::{self, RiskLevel};
use super::reports::{self, ReportRow, SortOrder};
use super::state::ViewState;
use crate::api::{Backend, Report, Segment, Severity, StressPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetail {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub date: String,
    pub caller_id: Option<String>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: &'static str,
    pub compliance: String,
    pub duration: String,
    pub intent: Option<String>,
    pub language: Option<String>,
    pub summary: Option<String>,
    pub pii_count: usize,
    pub violations: Vec<ViolationRow>,
    pub obligations: Vec<ObligationRow>,
    pub transcript: Vec<TranscriptLine>,
    pub stress: Option<StressSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRow {
    pub rule: String,
    pub severity: Severity,
    pub description: String,
    pub quote: Option<String>,
    /// Offset into the call as `m:ss`.
    pub at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationRow {
    pub sentence: String,
    pub keywords: Vec<String>,
    pub fulfilled: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Agent,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub start: f64,
    pub clock: String,
    pub text: String,
    pub stress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressSummary {
    pub peak: f64,
    pub average: f64,
    pub peak_time: String,
    pub samples: usize,
}

impl StressSummary {
    /// Summarize a stress timeline. `None` when there are no finite samples.
    pub fn from_points(points: &[StressPoint]) -> Option<Self> {
        let samples: Vec<&StressPoint> = points.iter().filter(|p| p.stress.is_finite()).collect();
        let peak = samples
            .iter()
            .copied()
            .reduce(|best, p| if p.stress > best.stress { p } else { best })?;
        let average = samples.iter().map(|p| p.stress).sum::<f64>() / samples.len() as f64;
        Some(Self {
            peak: peak.stress,
            average,
            peak_time: format::format_clock(peak.time),
            samples: samples.len(),
        })
    }
}

/// Agent and customer segments interleaved by start time.
///
/// The sort is stable, so an agent line and a customer line starting at the
/// same instant keep agent first.
pub fn merge_transcript(report: &Report) -> Vec<TranscriptLine> {
    let mut lines: Vec<TranscriptLine> = report
        .agent_segments
        .iter()
        .map(|s| transcript_line(Speaker::Agent, s))
        .chain(
            report
                .customer_segments
                .iter()
                .map(|s| transcript_line(Speaker::Customer, s)),
        )
        .collect();
    lines.sort_by(|a, b| a.start.total_cmp(&b.start));
    lines
}

fn transcript_line(speaker: Speaker, segment: &Segment) -> TranscriptLine {
    TranscriptLine {
        speaker,
        start: segment.start,
        clock: format::format_clock(segment.start),
        text: segment.text.trim().to_string(),
        stress: segment.stress,
    }
}

pub fn derive(report: &Report) -> ReportDetail {
    let level = report.risk_level();

    let mut violations: Vec<ViolationRow> = report
        .violations
        .iter()
        .map(|v| ViolationRow {
            rule: v.rule.clone(),
            severity: v.severity,
            description: v.description.clone(),
            quote: v.quote.clone().filter(|q| !q.trim().is_empty()),
            at: v.timestamp.map(format::format_clock),
        })
        .collect();
    violations.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));

    let transcript = merge_transcript(report);

    // Fall back to per-segment stress when the service sent no timeline.
    let stress = StressSummary::from_points(&report.stress_timeline).or_else(|| {
        let points: Vec<StressPoint> = transcript
            .iter()
            .filter_map(|l| {
                l.stress.map(|stress| StressPoint {
                    time: l.start,
                    stress,
                })
            })
            .collect();
        StressSummary::from_points(&points)
    });

    ReportDetail {
        id: report.id.clone(),
        title: report.title(),
        filename: report.display_filename().to_string(),
        date: report
            .timestamp
            .as_deref()
            .map(format::format_date)
            .unwrap_or_else(|| format::MISSING.to_string()),
        caller_id: report.caller_id.clone().filter(|c| !c.trim().is_empty()),
        risk_score: report.risk_score,
        risk_level: level,
        risk_color: level.color(),
        compliance: format::format_percent(report.compliance_score),
        duration: format::format_minutes(report.duration_seconds),
        intent: report.intent.clone(),
        language: report.language.clone(),
        summary: report.summary.clone(),
        pii_count: report.pii_count,
        violations,
        obligations: report
            .obligations
            .iter()
            .map(|o| ObligationRow {
                sentence: o.sentence.clone(),
                keywords: o.keywords.clone(),
                fulfilled: o.fulfilled,
            })
            .collect(),
        transcript,
        stress,
    }
}

/// Fetch and derive one report. A missing payload is [`ViewState::NotFound`].
pub fn load<B: Backend + ?Sized>(backend: &B, id: &str) -> ViewState<ReportDetail> {
    if id.trim().is_empty() {
        return ViewState::NotFound;
    }
    match backend.report(id) {
        Ok(Some(report)) => ViewState::Ready(derive(&report)),
        Ok(None) => ViewState::NotFound,
        Err(e) => ViewState::failed(&e),
    }
}

// ---------------------------------------------------------------------------
// Caller history
// ---------------------------------------------------------------------------

/// Past calls from the same caller, shown on demand below a report.
///
/// Every open refetches; nothing is cached between opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryPanel {
    visible: bool,
    state: ViewState<Vec<ReportRow>>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> &ViewState<Vec<ReportRow>> {
        &self.state
    }

    /// Hide a visible panel, or show a hidden one and fetch its contents.
    ///
    /// `current_id` is left out of the listing. A report without a caller id
    /// gets an empty panel and no request is made.
    pub fn toggle<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        caller_id: Option<&str>,
        current_id: &str,
    ) {
        if self.visible {
            self.visible = false;
            return;
        }
        self.visible = true;

        let Some(caller_id) = caller_id.map(str::trim).filter(|c| !c.is_empty()) else {
            self.state = ViewState::Ready(Vec::new());
            return;
        };

        self.state = ViewState::Loading;
        self.state = match backend.caller_history(caller_id) {
            Ok(history) => {
                let mut rows: Vec<ReportRow> = history
                    .iter()
                    .filter(|r| r.id != current_id)
                    .map(ReportRow::from_report)
                    .collect();
                reports::sort_rows(&mut rows, SortOrder::Newest);
                ViewState::Ready(rows)
            }
            Err(e) => ViewState::failed(&e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Obligation, Violation};

    fn seg(start: f64, text: &str, stress: Option<f64>) -> Segment {
        Segment {
            start,
            end: start + 2.0,
            text: text.to_string(),
            stress,
        }
    }

    fn violation(rule: &str, severity: Severity) -> Violation {
        Violation {
            rule: rule.to_string(),
            severity,
            ..Violation::default()
        }
    }

    #[test]
    fn violations_sorted_critical_first() {
        let report = Report {
            violations: vec![
                violation("a", Severity::Low),
                violation("b", Severity::Critical),
                violation("c", Severity::Unknown),
                violation("d", Severity::High),
            ],
            ..Report::default()
        };
        let rules: Vec<_> = derive(&report).violations.into_iter().map(|v| v.rule).collect();
        assert_eq!(rules, ["b", "d", "a", "c"]);
    }

    #[test]
    fn transcript_merges_by_start() {
        let report = Report {
            agent_segments: vec![seg(0.0, "Hello", None), seg(10.0, "Anything else?", None)],
            customer_segments: vec![seg(4.0, "Hi, about my loan", None), seg(10.0, "No", None)],
            ..Report::default()
        };
        let lines = merge_transcript(&report);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Hello", "Hi, about my loan", "Anything else?", "No"]);
        assert_eq!(lines[2].speaker, Speaker::Agent);
        assert_eq!(lines[1].clock, "0:04");
    }

    #[test]
    fn stress_summary_from_timeline() {
        let points = [
            StressPoint { time: 5.0, stress: 0.2 },
            StressPoint { time: 65.0, stress: 0.8 },
            StressPoint { time: 90.0, stress: 0.5 },
        ];
        let s = StressSummary::from_points(&points).unwrap();
        assert_eq!(s.peak, 0.8);
        assert_eq!(s.peak_time, "1:05");
        assert!((s.average - 0.5).abs() < 1e-9);
        assert!(StressSummary::from_points(&[]).is_none());
    }

    #[test]
    fn stress_falls_back_to_segments() {
        let report = Report {
            customer_segments: vec![seg(30.0, "angry", Some(0.9)), seg(40.0, "calm", None)],
            ..Report::default()
        };
        let detail = derive(&report);
        let stress = detail.stress.unwrap();
        assert_eq!(stress.samples, 1);
        assert_eq!(stress.peak_time, "0:30");
    }

    #[test]
    fn detail_defaults() {
        let report = Report {
            id: "r1".to_string(),
            obligations: vec![Obligation {
                sentence: "You must pay by Friday".to_string(),
                ..Obligation::default()
            }],
            caller_id: Some("  ".to_string()),
            ..Report::default()
        };
        let detail = derive(&report);
        assert_eq!(detail.title, "Unknown Call");
        assert_eq!(detail.date, format::MISSING);
        assert!(detail.caller_id.is_none());
        assert_eq!(detail.obligations.len(), 1);
        assert!(detail.stress.is_none());
    }
}
