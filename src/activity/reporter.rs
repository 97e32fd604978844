//! Activity reporter: aggregation over the request log.
//!
//! Reads the JSONL request log and provides:
//! - **Stats**: totals, failure rate, per-endpoint breakdown
//! - **Daily**: requests and failures per day

use std::collections::HashMap;

use crate::activity::logger::{self, RequestLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `callscope activity`.
#[derive(Debug)]
pub struct ActivityStats {
    pub total_requests: usize,
    pub failures: usize,
    pub avg_latency_ms: u64,
    pub endpoints: Vec<EndpointStat>,
    /// Most frequent error message, if any request failed.
    pub top_error: Option<String>,
}

impl ActivityStats {
    /// Failure rate as a percentage, 0.0 when there are no requests.
    pub fn failure_pct(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.failures as f64 / self.total_requests as f64) * 100.0
        }
    }
}

/// Per-route aggregated statistics.
#[derive(Debug, Clone)]
pub struct EndpointStat {
    pub endpoint: String,
    pub count: usize,
    pub failures: usize,
    pub avg_latency_ms: u64,
}

/// Requests on a single day.
#[derive(Debug, Clone)]
pub struct DailyActivity {
    pub date: String,
    pub requests: usize,
    pub failures: usize,
    pub avg_latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute stats from the request log, optionally limited to the last `days`.
pub fn compute_stats(days: Option<u32>) -> ActivityStats {
    build_stats(&logger::read_entries_since_days(days))
}

/// Compute per-day activity over the last `days` days.
pub fn compute_daily(days: u32) -> Vec<DailyActivity> {
    build_daily(&logger::read_entries_since_days(Some(days)))
}

pub fn build_stats(entries: &[RequestLogEntry]) -> ActivityStats {
    let total_requests = entries.len();
    let failures = entries.iter().filter(|e| !e.success).count();

    let mut groups: HashMap<String, Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        groups
            .entry(logger::endpoint_group(&entry.endpoint))
            .or_default()
            .push(entry);
    }

    let mut endpoints: Vec<EndpointStat> = groups
        .into_iter()
        .map(|(endpoint, group)| EndpointStat {
            endpoint,
            count: group.len(),
            failures: group.iter().filter(|e| !e.success).count(),
            avg_latency_ms: avg_latency(&group),
        })
        .collect();

    // Busiest first, ties broken by name for stable output
    endpoints.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.endpoint.cmp(&b.endpoint)));

    let mut error_counts: HashMap<&str, usize> = HashMap::new();
    for e in entries {
        if let Some(err) = e.error.as_deref() {
            *error_counts.entry(err).or_default() += 1;
        }
    }
    let top_error = error_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(err, _)| err.to_string());

    ActivityStats {
        total_requests,
        failures,
        avg_latency_ms: avg_latency(&entries.iter().collect::<Vec<_>>()),
        endpoints,
        top_error,
    }
}

pub fn build_daily(entries: &[RequestLogEntry]) -> Vec<DailyActivity> {
    let mut daily: HashMap<String, Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        // RFC 3339 timestamp, first 10 chars are YYYY-MM-DD
        let date = entry.timestamp.get(..10).unwrap_or("unknown").to_string();
        daily.entry(date).or_default().push(entry);
    }

    let mut days: Vec<DailyActivity> = daily
        .into_iter()
        .map(|(date, group)| DailyActivity {
            date,
            requests: group.len(),
            failures: group.iter().filter(|e| !e.success).count(),
            avg_latency_ms: avg_latency(&group),
        })
        .collect();

    days.sort_by(|a, b| a.date.cmp(&b.date));
    days
}

fn avg_latency(group: &[&RequestLogEntry]) -> u64 {
    if group.is_empty() {
        return 0;
    }
    group.iter().map(|e| e.latency_ms).sum::<u64>() / group.len() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: &str, endpoint: &str, latency_ms: u64, error: Option<&str>) -> RequestLogEntry {
        RequestLogEntry {
            timestamp: ts.to_string(),
            method: "GET".to_string(),
            endpoint: endpoint.to_string(),
            status: if error.is_none() { Some(200) } else { Some(502) },
            success: error.is_none(),
            latency_ms,
            error: error.map(str::to_string),
        }
    }

    fn sample_entries() -> Vec<RequestLogEntry> {
        vec![
            entry("2025-01-15T10:00:00+00:00", "/api/reports/a1", 100, None),
            entry("2025-01-15T10:05:00+00:00", "/api/reports/b2", 300, None),
            entry("2025-01-15T10:10:00+00:00", "/api/analytics/summary", 50, None),
            entry(
                "2025-01-16T09:00:00+00:00",
                "/api/chat/query",
                2000,
                Some("server returned HTTP 502"),
            ),
        ]
    }

    #[test]
    fn build_stats_totals() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.avg_latency_ms, 612);
        assert!((stats.failure_pct() - 25.0).abs() < f64::EPSILON);
        assert_eq!(stats.top_error.as_deref(), Some("server returned HTTP 502"));
    }

    #[test]
    fn build_stats_groups_report_ids() {
        let stats = build_stats(&sample_entries());
        let reports = &stats.endpoints[0];
        assert_eq!(reports.endpoint, "/api/reports/:id");
        assert_eq!(reports.count, 2);
        assert_eq!(reports.avg_latency_ms, 200);
    }

    #[test]
    fn build_stats_empty() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.failure_pct(), 0.0);
        assert!(stats.top_error.is_none());
    }

    #[test]
    fn build_daily_groups_by_date() {
        let days = build_daily(&sample_entries());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2025-01-15");
        assert_eq!(days[0].requests, 3);
        assert_eq!(days[1].failures, 1);
    }
}
