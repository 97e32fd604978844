use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config::schema::{LogLevel, LoggingConfig};

/// Process-wide logging settings, set once by [`init`].
///
/// Until `init` runs (e.g. in unit tests) the request log is disabled and
/// only errors reach the console.
static SETTINGS: OnceLock<LoggingConfig> = OnceLock::new();

/// Install the resolved `[logging]` config for this process.
pub fn init(config: &LoggingConfig) {
    let _ = SETTINGS.set(config.clone());
}

fn level() -> LogLevel {
    SETTINGS.get().map(|s| s.level).unwrap_or(LogLevel::Error)
}

fn request_log_enabled() -> bool {
    SETTINGS.get().is_some_and(|s| s.enabled)
}

// ---------------------------------------------------------------------------
// Console diagnostics
// ---------------------------------------------------------------------------

pub fn error(msg: &str) {
    emit(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    emit(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    emit(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    emit(LogLevel::Debug, msg);
}

fn emit(at: LogLevel, msg: &str) {
    if at > level() {
        return;
    }
    let tag = match at {
        LogLevel::Error => "error".red().bold(),
        LogLevel::Warn => "warn".yellow().bold(),
        LogLevel::Info => "info".cyan(),
        LogLevel::Debug => "debug".dimmed(),
    };
    eprintln!("{tag} {msg}");
}

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the request log (`~/.callscope/requests.jsonl`).
///
/// One line per API request, recorded by the fetch layer whether the
/// request succeeded or not. Used by the reporter for `callscope activity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub method: String,
    pub endpoint: String,
    /// HTTP status, absent for transport and decode failures.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub success: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Collapse resource ids so requests group by route.
///
/// `/api/reports/abc123` becomes `/api/reports/:id` and
/// `/api/callers/555/reports` becomes `/api/callers/:id/reports`.
pub fn endpoint_group(endpoint: &str) -> String {
    let path = endpoint.split('?').next().unwrap_or(endpoint);
    let mut out: Vec<&str> = Vec::new();
    let mut previous = "";
    for segment in path.split('/') {
        if matches!(previous, "reports" | "callers") && !segment.is_empty() && segment != "reports"
        {
            out.push(":id");
        } else {
            out.push(segment);
        }
        previous = segment;
    }
    out.join("/")
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Record one API request. Best-effort; failures are ignored.
pub fn log_request(
    method: &str,
    endpoint: &str,
    status: Option<u16>,
    success: bool,
    latency_ms: u64,
    error: Option<&str>,
) {
    if !request_log_enabled() {
        return;
    }
    let Some(path) = request_log_path() else {
        return;
    };

    let entry = RequestLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        method: method.to_string(),
        endpoint: endpoint.to_string(),
        status,
        success,
        latency_ms,
        error: error.map(str::to_string),
    };

    let _ = append_entry(&path, &entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all request log entries. Empty if the log doesn't exist.
pub fn read_all_entries() -> Vec<RequestLogEntry> {
    request_log_path()
        .map(|path| read_entries_from(&path))
        .unwrap_or_default()
}

/// Read entries from a specific log file, silently skipping malformed lines.
pub fn read_entries_from(path: &Path) -> Vec<RequestLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Read log entries filtered to the last N days. `None` returns everything.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<RequestLogEntry> {
    filter_since_days(read_all_entries(), days)
}

pub(crate) fn filter_since_days(
    entries: Vec<RequestLogEntry>,
    days: Option<u32>,
) -> Vec<RequestLogEntry> {
    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub(crate) fn append_entry(path: &Path, entry: &RequestLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the request log file.
pub fn request_log_path() -> Option<PathBuf> {
    crate::config::home_dir().map(|dir| dir.join("requests.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
