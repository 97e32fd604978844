//! Display derivations shared by every page.
//!
//! Risk bucketing lives here and nowhere else; pages, the CLI and the web
//! dashboard all call [`risk_bucket`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scores at or above this are medium risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 35.0;

/// Scores at or above this are high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 65.0;

/// Placeholder for a missing numeric value.
pub const MISSING: &str = "—";

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Coarse risk bucket derived from a numeric risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH", alias = "critical")]
    High,
}

impl RiskLevel {
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => GREEN,
            Self::Medium => YELLOW,
            Self::High => RED,
        }
    }

    /// Parse a bucket label in any case. `critical` folds into high.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" | "critical" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Bucket a risk score: below 35 is low, below 65 is medium, else high.
///
/// NaN scores are treated as low.
pub fn risk_bucket(score: f64) -> RiskLevel {
    if score >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Numbers and durations
// ---------------------------------------------------------------------------

/// Round to an integer percentage, e.g. `87%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", v.round() as i64),
        _ => MISSING.to_string(),
    }
}

/// Seconds rendered as whole minutes, e.g. `4 min`.
pub fn format_minutes(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => {
            if s < 30.0 {
                "<1 min".to_string()
            } else {
                format!("{} min", (s / 60.0).round() as u64)
            }
        }
        _ => MISSING.to_string(),
    }
}

/// Offset into a call as `m:ss`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y%m%d_%H%M%S",
];

/// Render a timestamp as `Jan 05, 2024 14:30`.
///
/// Accepts RFC 3339 and a few naive layouts; anything else is returned
/// verbatim so nothing is lost.
pub fn format_date(raw: &str) -> String {
    const OUT: &str = "%b %d, %Y %H:%M";

    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    for layout in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return dt.format(OUT).to_string();
        }
    }
    raw.to_string()
}

/// Parse a timestamp for ordering. Unparseable values yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const GREEN: &str = "#3fb950";
const YELLOW: &str = "#d29922";
const RED: &str = "#f85149";

/// Colors cycled for distribution names without a fixed entry.
const FALLBACK_PALETTE: &[&str] = &[
    "#58a6ff", "#bc8cff", "#39d2c0", "#f778ba", "#ffa657", "#8b949e",
];

/// Color for a distribution bucket.
///
/// Known risk and compliance names map to fixed colors; anything else takes
/// the fallback palette by its position in the series.
pub fn palette_color(name: &str, index: usize) -> &'static str {
    let key = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    match key.as_str() {
        "low" | "compliant" | "pass" | "passed" => GREEN,
        "medium" | "partial" | "partially_compliant" | "warning" => YELLOW,
        "high" | "critical" | "non_compliant" | "noncompliant" | "fail" | "failed" => RED,
        _ => FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()],
    }
}

// ---------------------------------------------------------------------------
// Call titles
// ---------------------------------------------------------------------------

/// Leading recording timestamp: `20240101_120000_` or `2024-01-01_12-00-00_`.
static DATE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d{8}[_\-T ]?\d{6}|\d{4}-\d{2}-\d{2}[_T ]\d{2}[-:.]?\d{2}[-:.]?\d{2})(?:[_\- ]+|$)",
    )
    .expect("date prefix regex must compile")
});

/// Characters of a numeric id kept in the placeholder title.
const PLACEHOLDER_ID_CHARS: usize = 8;

/// Derive a readable title from a recording filename.
///
/// Strips the directory, the extension and a leading date-time prefix, then
/// turns `_`/`-` separators into spaces. A remainder that is empty or purely
/// numeric becomes `Call Recording — <id>...`.
pub fn call_title(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && !ext.contains(' ') => stem,
        _ => name,
    };

    let rest = DATE_PREFIX_RE.replace(stem, "");
    let title = rest
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let numeric = title.chars().all(|c| c.is_ascii_digit() || c == ' ');
    if title.is_empty() || numeric {
        let id: String = if title.is_empty() { stem } else { title.as_str() }
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(PLACEHOLDER_ID_CHARS)
            .collect();
        return format!("Call Recording — {id}...");
    }

    title
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_bucket_thresholds() {
        assert_eq!(risk_bucket(0.0), RiskLevel::Low);
        assert_eq!(risk_bucket(34.9), RiskLevel::Low);
        assert_eq!(risk_bucket(35.0), RiskLevel::Medium);
        assert_eq!(risk_bucket(64.99), RiskLevel::Medium);
        assert_eq!(risk_bucket(65.0), RiskLevel::High);
        assert_eq!(risk_bucket(100.0), RiskLevel::High);
        assert_eq!(risk_bucket(f64::NAN), RiskLevel::Low);
    }

    #[test]
    fn risk_bucket_is_monotonic() {
        let mut previous = risk_bucket(-10.0);
        for step in -100..=1200 {
            let level = risk_bucket(step as f64 / 10.0);
            assert!(level >= previous, "bucket dropped at {}", step as f64 / 10.0);
            previous = level;
        }
    }

    #[test]
    fn risk_level_parse_and_deserialize() {
        assert_eq!(RiskLevel::parse(" HIGH "), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("med"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse("Critical"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("severe"), None);
        let level: RiskLevel = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn percent_rounds_to_integer() {
        assert_eq!(format_percent(Some(87.4)), "87%");
        assert_eq!(format_percent(Some(87.5)), "88%");
        assert_eq!(format_percent(Some(0.0)), "0%");
        assert_eq!(format_percent(None), MISSING);
        assert_eq!(format_percent(Some(f64::NAN)), MISSING);
    }

    #[test]
    fn minutes_from_seconds() {
        assert_eq!(format_minutes(Some(10.0)), "<1 min");
        assert_eq!(format_minutes(Some(240.0)), "4 min");
        assert_eq!(format_minutes(Some(269.0)), "4 min");
        assert_eq!(format_minutes(Some(271.0)), "5 min");
        assert_eq!(format_minutes(None), MISSING);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.7), "1:05");
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn date_formats() {
        assert_eq!(format_date("2024-01-05T14:30:00Z"), "Jan 05, 2024 14:30");
        assert_eq!(format_date("2024-01-05T14:30:00.123"), "Jan 05, 2024 14:30");
        assert_eq!(format_date("2024-01-05 09:07:00"), "Jan 05, 2024 09:07");
        assert_eq!(format_date("20240105_143000"), "Jan 05, 2024 14:30");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn parse_timestamp_orders_mixed_layouts() {
        let a = parse_timestamp("2024-01-05T14:30:00Z").unwrap();
        let b = parse_timestamp("2024-01-06 09:00:00").unwrap();
        assert!(a < b);
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn palette_fixed_and_fallback() {
        assert_eq!(palette_color("High", 0), RED);
        assert_eq!(palette_color("non-compliant", 3), RED);
        assert_eq!(palette_color("Partially Compliant", 1), YELLOW);
        assert_eq!(palette_color("billing", 0), FALLBACK_PALETTE[0]);
        assert_eq!(
            palette_color("billing", FALLBACK_PALETTE.len() + 1),
            FALLBACK_PALETTE[1]
        );
    }

    #[test]
    fn call_title_strips_prefix_and_extension() {
        assert_eq!(call_title("20240101_120000_callrecording.wav"), "callrecording");
        assert_eq!(
            call_title("2024-03-15_09-30-00_loan-followup_call.mp3"),
            "loan followup call"
        );
        assert_eq!(call_title("uploads/customer_complaint.m4a"), "customer complaint");
    }

    #[test]
    fn call_title_numeric_placeholder() {
        assert_eq!(call_title("482913"), "Call Recording — 482913...");
        assert_eq!(
            call_title("20240101_120000_5551234567.wav"),
            "Call Recording — 55512345..."
        );
        assert_eq!(call_title("20240101_120000.wav"), "Call Recording — 20240101...");
    }

    #[test]
    fn call_title_is_stable_on_its_output() {
        let once = call_title("20240101_120000_callrecording.wav");
        assert_eq!(call_title(&once), once);
    }
}
