//! Rendering-ready card and series shapes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::format;

/// Headline number on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    /// Accent color, when the value carries a risk or compliance meaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

impl StatCard {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            color: None,
        }
    }

    pub fn colored(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

/// One bar of a distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub count: u64,
    /// Share of the series total, rounded to an integer.
    pub pct: u32,
    pub color: &'static str,
}

/// Names listed first in a risk distribution, in this order.
const RISK_ORDER: &[&str] = &["low", "medium", "high"];

/// Build a chart series from a name -> count map.
///
/// Buckets named in `leading` come first in that order; the rest follow by
/// descending count, then name.
pub fn distribution_series(counts: &BTreeMap<String, u64>, leading: &[&str]) -> Vec<SeriesPoint> {
    let total: u64 = counts.values().sum();

    let mut entries: Vec<(&String, u64)> = counts.iter().map(|(k, v)| (k, *v)).collect();
    let rank = |name: &str| {
        leading
            .iter()
            .position(|l| l.eq_ignore_ascii_case(name))
            .unwrap_or(leading.len())
    };
    entries.sort_by(|a, b| {
        rank(a.0)
            .cmp(&rank(b.0))
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.cmp(b.0))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, count))| SeriesPoint {
            label: humanize(name),
            count,
            pct: share(count, total),
            color: format::palette_color(name, i),
        })
        .collect()
}

/// Risk distribution ordered low, medium, high.
pub fn risk_series(counts: &BTreeMap<String, u64>) -> Vec<SeriesPoint> {
    distribution_series(counts, RISK_ORDER)
}

/// Look up a bucket count ignoring case.
pub fn bucket_count(counts: &BTreeMap<String, u64>, name: &str) -> u64 {
    counts
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
        .sum()
}

fn share(count: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * 100.0).round() as u32
    }
}

/// `non_compliant` -> `Non compliant`.
fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn risk_series_orders_and_shares() {
        let series = risk_series(&counts(&[("high", 1), ("low", 2), ("medium", 1)]));
        let labels: Vec<_> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Low", "Medium", "High"]);
        assert_eq!(series[0].pct, 50);
        assert_eq!(series[2].color, format::palette_color("high", 0));
    }

    #[test]
    fn unknown_buckets_sort_by_count() {
        let series = distribution_series(
            &counts(&[("billing", 2), ("loan_inquiry", 5), ("complaint", 2)]),
            &[],
        );
        let labels: Vec<_> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Loan inquiry", "Billing", "Complaint"]);
    }

    #[test]
    fn empty_distribution() {
        assert!(risk_series(&BTreeMap::new()).is_empty());
        assert_eq!(share(0, 0), 0);
    }

    #[test]
    fn bucket_count_ignores_case() {
        assert_eq!(bucket_count(&counts(&[("High", 3), ("low", 1)]), "high"), 3);
        assert_eq!(bucket_count(&counts(&[("low", 1)]), "high"), 0);
    }
}
