//! CLI command implementations for callscope.
//!
//! Provides subcommand handlers for:
//! - `callscope home | analytics | reports | report <id>`: dashboard pages
//! - `callscope export`: download the CSV export
//! - `callscope ask | chat | suggestions`: ask questions about the calls
//! - `callscope scan <file>`: local transcript scan
//! - `callscope activity`: request log summary
//! - `callscope health`: check config, API and request log
//! - `callscope config show|init|set|reset`: configuration management

pub mod chat;
pub mod markdown;
pub mod pages;
pub mod scan;

use anyhow::Result;
use colored::{ColoredString, Colorize};

use crate::activity::logger;
use crate::activity::reporter::{self, ActivityStats, DailyActivity};
use crate::api::ApiClient;
use crate::config;
use crate::config::schema::CallscopeConfig;
use crate::view::format::RiskLevel;
use crate::view::home::format_count;
use crate::view::state::ViewState;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// callscope activity
// ---------------------------------------------------------------------------

/// Summarize the request log.
pub fn run_activity(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let stats = reporter::compute_stats(days);

    if stats.total_requests == 0 {
        println!(
            "{}",
            "No requests logged yet. Run a few callscope commands first.".yellow()
        );
        return Ok(());
    }

    let daily = reporter::compute_daily(days.unwrap_or(7));
    match format {
        OutputFormat::Json => print_activity_json(&stats, &daily)?,
        OutputFormat::Csv => print_activity_csv(&stats),
        OutputFormat::Table => print_activity_table(&stats, &daily),
    }

    Ok(())
}

fn print_activity_table(stats: &ActivityStats, daily: &[DailyActivity]) {
    println!("{}", "callscope API Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Requests:   ".bold(), format_count(stats.total_requests as u64));
    println!(
        "  {} {} ({:.1}%)",
        "Failures:   ".bold(),
        stats.failures,
        stats.failure_pct()
    );
    println!("  {} {}ms", "Avg latency:".bold(), stats.avg_latency_ms);
    if let Some(err) = &stats.top_error {
        println!("  {} {}", "Top error:  ".bold(), err.red());
    }
    println!();

    if !stats.endpoints.is_empty() {
        println!("{}", "Endpoints".bold().cyan());
        println!(
            "  {:<32} {:>7} {:>9} {:>10}",
            "Endpoint", "Count", "Failures", "Latency"
        );
        println!("  {}", "-".repeat(60));
        for (i, ep) in stats.endpoints.iter().enumerate() {
            let line = format!(
                "  {:<32} {:>7} {:>9} {:>8}ms",
                truncate(&ep.endpoint, 32),
                ep.count,
                ep.failures,
                ep.avg_latency_ms,
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
        println!();
    }

    if !daily.is_empty() {
        println!("{}", "Daily".bold().cyan());
        println!("  {:<12} {:>9} {:>9} {:>10}", "Date", "Requests", "Failures", "Latency");
        println!("  {}", "-".repeat(44));
        for day in daily {
            println!(
                "  {:<12} {:>9} {:>9} {:>8}ms",
                day.date, day.requests, day.failures, day.avg_latency_ms
            );
        }
    }
}

fn print_activity_json(stats: &ActivityStats, daily: &[DailyActivity]) -> Result<()> {
    let value = serde_json::json!({
        "total_requests": stats.total_requests,
        "failures": stats.failures,
        "failure_pct": stats.failure_pct(),
        "avg_latency_ms": stats.avg_latency_ms,
        "top_error": stats.top_error,
        "endpoints": stats.endpoints.iter().map(|e| serde_json::json!({
            "endpoint": e.endpoint,
            "count": e.count,
            "failures": e.failures,
            "avg_latency_ms": e.avg_latency_ms,
        })).collect::<Vec<_>>(),
        "daily": daily.iter().map(|d| serde_json::json!({
            "date": d.date,
            "requests": d.requests,
            "failures": d.failures,
            "avg_latency_ms": d.avg_latency_ms,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_activity_csv(stats: &ActivityStats) {
    println!("endpoint,count,failures,avg_latency_ms");
    for e in &stats.endpoints {
        println!(
            "{},{},{},{}",
            csv_field(&e.endpoint),
            e.count,
            e.failures,
            e.avg_latency_ms
        );
    }
}

// ---------------------------------------------------------------------------
// callscope health
// ---------------------------------------------------------------------------

/// Check config files, API reachability and the request log.
pub fn run_health(cfg: &CallscopeConfig) -> Result<()> {
    println!("{}", "callscope Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.callscope/config.toml found"
        } else {
            "not found (run `callscope config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".callscope.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = ApiClient::from_config(&cfg.api);
    let api_ok = client.is_healthy();
    let api_detail = if api_ok {
        format!("reachable at {}", client.base_url())
    } else {
        format!("not reachable at {} — is the service running?", client.base_url())
    };
    print_health_item("Analysis API", api_ok, &api_detail);
    print_health_item("Timeout", true, &format!("{}ms", cfg.api.timeout_ms));

    let log_exists = logger::request_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_detail = if !cfg.logging.enabled {
        "disabled ([logging] enabled = false)".to_string()
    } else if log_exists {
        format!("{} entries", logger::read_all_entries().len())
    } else {
        "no log file yet".to_string()
    };
    print_health_item("Request log", cfg.logging.enabled && log_exists, &log_detail);

    println!();
    println!(
        "  {} Run `callscope web` to open the dashboard at http://{}",
        "Hint:".dimmed(),
        cfg.web.addr
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// callscope config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective callscope Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.callscope/config.toml", global_exists);
    print_source(".callscope.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "CALLSCOPE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.callscope/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to point callscope at your service.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Print the error panel for a failed page. Returns true if one was printed.
pub(crate) fn print_view_error<T>(state: &ViewState<T>, back_hint: &str) -> bool {
    let Some(message) = state.error_message() else {
        return false;
    };
    let title = match state {
        ViewState::NotFound => "Not found",
        _ => "Something went wrong",
    };
    eprintln!("{} {}", "✗".red().bold(), title.red().bold());
    eprintln!("  {message}");
    eprintln!("  {} {}", "→".dimmed(), back_hint.dimmed());
    true
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
pub(crate) fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Paint text with a `#rrggbb` palette color.
pub(crate) fn paint(text: &str, hex: &str) -> ColoredString {
    match hex_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Colored risk badge.
pub(crate) fn risk_badge(level: RiskLevel) -> ColoredString {
    let label = level.to_string().to_uppercase();
    match level {
        RiskLevel::Low => label.green().bold(),
        RiskLevel::Medium => label.yellow().bold(),
        RiskLevel::High => label.red().bold(),
    }
}

/// Horizontal bar for a percentage, `width` cells at 100%.
pub(crate) fn bar(pct: u32, width: usize) -> String {
    let cells = ((pct.min(100) as usize * width) + 50) / 100;
    "█".repeat(cells)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("звонок клиента", 6), "звоно…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#3fb950"), Some((0x3f, 0xb9, 0x50)));
        assert_eq!(hex_rgb("3fb950"), None);
        assert_eq!(hex_rgb("#fff"), None);
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar(0, 20), "");
        assert_eq!(bar(50, 20).chars().count(), 10);
        assert_eq!(bar(150, 20).chars().count(), 20);
    }
}
