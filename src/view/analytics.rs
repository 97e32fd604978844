//! Analytics page: distributions, trend series and scalar stats.

use serde::Serialize;

use super::chart::{self, SeriesPoint, StatCard};
use super::format;
use super::home::format_count;
use super::state::{self, ViewState};
use crate::api::{AnalyticsSummary, AnalyticsTrends, Backend, TrendPoint};

const COMPLIANCE_ORDER: &[&str] = &["compliant", "partial", "partially_compliant", "non_compliant"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub cards: Vec<StatCard>,
    pub risk: Vec<SeriesPoint>,
    pub intent: Vec<SeriesPoint>,
    pub compliance: Vec<SeriesPoint>,
    pub trend: Vec<TrendRow>,
    pub stats: Vec<ScalarStat>,
}

/// One call on the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub report_id: Option<String>,
    pub label: String,
    pub compliance: f64,
    pub risk: f64,
    pub violations: u32,
}

impl TrendRow {
    fn from_point(point: &TrendPoint, index: usize) -> Self {
        let label = match (point.timestamp.as_deref(), point.filename.as_deref()) {
            (Some(ts), _) if !ts.trim().is_empty() => format::format_date(ts),
            (_, Some(name)) if !name.trim().is_empty() => format::call_title(name),
            _ => format!("Call {}", index + 1),
        };
        Self {
            report_id: point.report_id.clone(),
            label,
            compliance: point.compliance_score,
            risk: point.risk_score,
            violations: point.violation_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarStat {
    pub label: &'static str,
    pub value: String,
}

fn score(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => format::MISSING.to_string(),
    }
}

/// Derive the page. `trend_points` keeps the most recent N points, 0 keeps all.
pub fn derive(
    summary: &AnalyticsSummary,
    trends: &AnalyticsTrends,
    trend_points: usize,
) -> AnalyticsView {
    let cards = vec![
        StatCard::new("Total Calls", format_count(summary.total_calls)),
        StatCard::new("Avg Compliance", format::format_percent(summary.avg_compliance)),
        StatCard {
            color: summary.avg_risk.map(|r| format::risk_bucket(r).color()),
            ..StatCard::new("Avg Risk Score", score(summary.avg_risk))
        },
        StatCard::new("Total Violations", format_count(summary.total_violations)),
    ];

    let skip = match trend_points {
        0 => 0,
        n => trends.trends.len().saturating_sub(n),
    };
    let trend = trends
        .trends
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, p)| TrendRow::from_point(p, i))
        .collect();

    let stats = vec![
        ScalarStat {
            label: "Average compliance",
            value: format::format_percent(summary.avg_compliance),
        },
        ScalarStat {
            label: "Lowest compliance",
            value: format::format_percent(summary.min_compliance),
        },
        ScalarStat {
            label: "Highest compliance",
            value: format::format_percent(summary.max_compliance),
        },
        ScalarStat {
            label: "Average risk score",
            value: score(summary.avg_risk),
        },
        ScalarStat {
            label: "Average call duration",
            value: format::format_minutes(summary.avg_duration_seconds),
        },
        ScalarStat {
            label: "Total call time",
            value: format::format_minutes(summary.total_duration_seconds),
        },
    ];

    AnalyticsView {
        cards,
        risk: chart::risk_series(&summary.risk_distribution),
        intent: chart::distribution_series(&summary.intent_distribution, &[]),
        compliance: chart::distribution_series(&summary.compliance_distribution, COMPLIANCE_ORDER),
        trend,
        stats,
    }
}

/// Fetch summary and trends together, then derive the page.
pub fn load<B: Backend + ?Sized>(backend: &B, trend_points: usize) -> ViewState<AnalyticsView> {
    let (summary, trends) = state::fetch_pair(|| backend.summary(), || backend.trends());
    state::settle_pair(summary, trends, |summary, trends| {
        derive(&summary, &trends, trend_points)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: Option<&str>, compliance: f64) -> TrendPoint {
        TrendPoint {
            timestamp: ts.map(str::to_string),
            compliance_score: compliance,
            ..TrendPoint::default()
        }
    }

    #[test]
    fn trend_is_trimmed_to_most_recent() {
        let trends = AnalyticsTrends {
            trends: (0..10).map(|i| point(None, i as f64)).collect(),
        };
        let view = derive(&AnalyticsSummary::default(), &trends, 3);
        let compliance: Vec<_> = view.trend.iter().map(|t| t.compliance).collect();
        assert_eq!(compliance, [7.0, 8.0, 9.0]);
        assert_eq!(view.trend[0].label, "Call 8");

        let all = derive(&AnalyticsSummary::default(), &trends, 0);
        assert_eq!(all.trend.len(), 10);
    }

    #[test]
    fn trend_label_prefers_date_then_title() {
        let mut p = point(Some("2024-01-05T14:30:00Z"), 90.0);
        assert_eq!(TrendRow::from_point(&p, 0).label, "Jan 05, 2024 14:30");
        p.timestamp = None;
        p.filename = Some("20240105_143000_refund_call.wav".to_string());
        assert_eq!(TrendRow::from_point(&p, 0).label, "refund call");
    }

    #[test]
    fn scalar_stats_format_missing() {
        let summary = AnalyticsSummary {
            avg_compliance: Some(91.2),
            avg_risk: Some(42.26),
            avg_duration_seconds: Some(300.0),
            ..AnalyticsSummary::default()
        };
        let view = derive(&summary, &AnalyticsTrends::default(), 30);
        assert_eq!(view.stats[0].value, "91%");
        assert_eq!(view.stats[1].value, format::MISSING);
        assert_eq!(view.stats[3].value, "42.3");
        assert_eq!(view.stats[4].value, "5 min");
        assert_eq!(view.cards[2].color, Some(format::RiskLevel::Medium.color()));
    }

    #[test]
    fn compliance_series_orders_known_buckets() {
        let summary = AnalyticsSummary {
            compliance_distribution: [
                ("non_compliant".to_string(), 1),
                ("compliant".to_string(), 4),
            ]
            .into_iter()
            .collect(),
            ..AnalyticsSummary::default()
        };
        let view = derive(&summary, &AnalyticsTrends::default(), 30);
        assert_eq!(view.compliance[0].label, "Compliant");
        assert_eq!(view.compliance[0].pct, 80);
    }
}
