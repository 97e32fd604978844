//! Dashboard pages rendered in the terminal.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use super::{OutputFormat, bar, csv_field, paint, print_view_error, risk_badge, truncate};
use crate::api::Backend;
use crate::config::schema::CallscopeConfig;
use crate::export::{self, NoticeBoard, NoticeKind};
use crate::view::analytics::{self, AnalyticsView};
use crate::view::chart::{SeriesPoint, StatCard};
use crate::view::detail::{self, HistoryPanel, ReportDetail, Speaker};
use crate::view::format;
use crate::view::home::{self, HomeView};
use crate::view::reports::{self, ReportFilter, ReportRow, ReportsView};
use crate::view::state::ViewState;

const BACK_HINT: &str = "Run `callscope home` to return to the dashboard.";
const BAR_WIDTH: usize = 24;

// ---------------------------------------------------------------------------
// callscope home
// ---------------------------------------------------------------------------

pub fn run_home<B: Backend + ?Sized>(
    backend: &B,
    cfg: &CallscopeConfig,
    format: OutputFormat,
) -> Result<()> {
    let state = home::load(backend, cfg.display.recent_reports);
    if print_view_error(&state, "Check `callscope health` and try again.") {
        return Ok(());
    }
    let Some(view) = state.ready() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => print_rows_csv(&view.recent),
        OutputFormat::Table => print_home_table(view),
    }
    Ok(())
}

fn print_home_table(view: &HomeView) {
    println!("{}", "Call Analysis Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    print_cards(&view.cards);
    println!();

    if !view.risk_breakdown.is_empty() {
        println!("{}", "Risk Breakdown".bold().cyan());
        print_series(&view.risk_breakdown);
        println!();
    }

    println!("{}", "Recent Calls".bold().cyan());
    if view.recent.is_empty() {
        println!("  {}", "No calls analyzed yet.".dimmed());
    } else {
        print_rows_table(&view.recent);
    }
}

// ---------------------------------------------------------------------------
// callscope analytics
// ---------------------------------------------------------------------------

pub fn run_analytics<B: Backend + ?Sized>(
    backend: &B,
    cfg: &CallscopeConfig,
    format: OutputFormat,
) -> Result<()> {
    let state = analytics::load(backend, cfg.display.trend_points);
    if print_view_error(&state, BACK_HINT) {
        return Ok(());
    }
    let Some(view) = state.ready() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => print_analytics_csv(view),
        OutputFormat::Table => print_analytics_table(view),
    }
    Ok(())
}

fn print_analytics_table(view: &AnalyticsView) {
    println!("{}", "Analytics".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    print_cards(&view.cards);
    println!();

    for (title, series) in [
        ("Risk Distribution", &view.risk),
        ("Call Intents", &view.intent),
        ("Compliance", &view.compliance),
    ] {
        if series.is_empty() {
            continue;
        }
        println!("{}", title.bold().cyan());
        print_series(series);
        println!();
    }

    if !view.trend.is_empty() {
        println!("{}", "Trend".bold().cyan());
        println!(
            "  {:<22} {:>11} {:>6} {:>11}",
            "Call", "Compliance", "Risk", "Violations"
        );
        println!("  {}", "-".repeat(54));
        for point in &view.trend {
            let risk = format!("{:>6.0}", point.risk);
            println!(
                "  {:<22} {:>11} {} {:>11}",
                truncate(&point.label, 22),
                format::format_percent(Some(point.compliance)),
                paint(&risk, format::risk_bucket(point.risk).color()),
                point.violations,
            );
        }
        println!();
    }

    println!("{}", "Statistics".bold().cyan());
    for stat in &view.stats {
        println!("  {:<24} {}", stat.label, stat.value.bold());
    }
}

fn print_analytics_csv(view: &AnalyticsView) {
    println!("series,label,count,pct");
    for (name, series) in [
        ("risk", &view.risk),
        ("intent", &view.intent),
        ("compliance", &view.compliance),
    ] {
        for p in series {
            println!("{},{},{},{}", name, csv_field(&p.label), p.count, p.pct);
        }
    }
}

// ---------------------------------------------------------------------------
// callscope reports
// ---------------------------------------------------------------------------

pub fn run_reports<B: Backend + ?Sized>(
    backend: &B,
    filter: &ReportFilter,
    format: OutputFormat,
) -> Result<()> {
    let state = reports::load(backend, filter);
    if print_view_error(&state, BACK_HINT) {
        return Ok(());
    }
    let Some(view) = state.ready() else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => print_rows_csv(&view.rows),
        OutputFormat::Table => print_reports_table(view),
    }
    Ok(())
}

fn print_reports_table(view: &ReportsView) {
    println!("{}", "Call Reports".bold().cyan());
    println!("{}", "=".repeat(60));

    let mut applied = Vec::new();
    if let Some(risk) = view.filter.risk {
        applied.push(format!("risk={risk}"));
    }
    if !view.filter.search.trim().is_empty() {
        applied.push(format!("search=\"{}\"", view.filter.search.trim()));
    }
    applied.push(format!("sort={}", view.filter.sort));
    println!(
        "  {} of {} reports  {}",
        view.rows.len(),
        view.total,
        applied.join("  ").dimmed()
    );
    println!();

    if view.rows.is_empty() {
        println!("  {}", "No reports match the current filters.".yellow());
        return;
    }
    print_rows_table(&view.rows);
}

// ---------------------------------------------------------------------------
// callscope report <id>
// ---------------------------------------------------------------------------

pub fn run_report<B: Backend + ?Sized>(
    backend: &B,
    id: &str,
    with_history: bool,
    format: OutputFormat,
) -> Result<()> {
    let state = detail::load(backend, id);
    if print_view_error(&state, "Run `callscope reports` to browse all reports.") {
        return Ok(());
    }
    let Some(view) = state.ready() else {
        return Ok(());
    };

    let mut history = HistoryPanel::new();
    if with_history {
        history.toggle(backend, view.caller_id.as_deref(), &view.id);
    }

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "report": view,
                "history": with_history.then(|| history.state()),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => print_violations_csv(view),
        OutputFormat::Table => {
            print_report_table(view);
            if with_history {
                print_history(&history);
            }
        }
    }
    Ok(())
}

fn print_report_table(view: &ReportDetail) {
    println!("{}", view.title.bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {:<14} {}", "File".bold(), view.filename);
    println!("  {:<14} {}", "Date".bold(), view.date);
    println!(
        "  {:<14} {} ({:.0})",
        "Risk".bold(),
        risk_badge(view.risk_level),
        view.risk_score
    );
    println!("  {:<14} {}", "Compliance".bold(), view.compliance);
    println!("  {:<14} {}", "Duration".bold(), view.duration);
    if let Some(intent) = &view.intent {
        println!("  {:<14} {}", "Intent".bold(), intent);
    }
    if let Some(language) = &view.language {
        println!("  {:<14} {}", "Language".bold(), language);
    }
    if view.pii_count > 0 {
        println!("  {:<14} {}", "PII found".bold(), view.pii_count.to_string().red());
    }
    if let Some(caller) = &view.caller_id {
        println!("  {:<14} {}", "Caller".bold(), caller);
    }
    if let Some(summary) = &view.summary {
        println!();
        println!("  {}", summary);
    }
    println!();

    println!("{}", format!("Violations ({})", view.violations.len()).bold().cyan());
    if view.violations.is_empty() {
        println!("  {}", "None detected.".green());
    }
    for v in &view.violations {
        let at = v.at.as_deref().map(|t| format!(" @ {t}")).unwrap_or_default();
        println!(
            "  {} {}{}",
            format!("[{}]", v.severity.to_string().to_uppercase()).red().bold(),
            v.rule.bold(),
            at.dimmed()
        );
        if !v.description.is_empty() {
            println!("      {}", v.description);
        }
        if let Some(quote) = &v.quote {
            println!("      {}", format!("\"{quote}\"").italic().dimmed());
        }
    }
    println!();

    if !view.obligations.is_empty() {
        println!("{}", "Obligations".bold().cyan());
        for o in &view.obligations {
            let mark = match o.fulfilled {
                Some(true) => "✓".green().bold(),
                Some(false) => "✗".red().bold(),
                None => "·".dimmed(),
            };
            println!("  {} {}", mark, o.sentence);
            if !o.keywords.is_empty() {
                println!("      {}", o.keywords.join(", ").dimmed());
            }
        }
        println!();
    }

    if let Some(stress) = &view.stress {
        println!("{}", "Stress".bold().cyan());
        println!(
            "  peak {:.2} at {}  ·  average {:.2}  ·  {} samples",
            stress.peak, stress.peak_time, stress.average, stress.samples
        );
        println!();
    }

    if !view.transcript.is_empty() {
        println!("{}", "Transcript".bold().cyan());
        for line in &view.transcript {
            let speaker = match line.speaker {
                Speaker::Agent => "Agent   ".blue().bold(),
                Speaker::Customer => "Customer".magenta().bold(),
            };
            println!("  {} {} {}", line.clock.dimmed(), speaker, line.text);
        }
    }
}

fn print_history(panel: &HistoryPanel) {
    println!();
    println!("{}", "Caller History".bold().cyan());
    match panel.state() {
        ViewState::Ready(rows) if rows.is_empty() => {
            println!("  {}", "No other calls from this caller.".dimmed());
        }
        ViewState::Ready(rows) => print_rows_table(rows),
        state => {
            if let Some(msg) = state.error_message() {
                println!("  {}", msg.red());
            }
        }
    }
}

fn print_violations_csv(view: &ReportDetail) {
    println!("rule,severity,description,quote,at");
    for v in &view.violations {
        println!(
            "{},{},{},{},{}",
            csv_field(&v.rule),
            v.severity,
            csv_field(&v.description),
            csv_field(v.quote.as_deref().unwrap_or_default()),
            v.at.as_deref().unwrap_or_default(),
        );
    }
}

// ---------------------------------------------------------------------------
// callscope export
// ---------------------------------------------------------------------------

pub fn run_export<B: Backend + ?Sized>(
    backend: &B,
    cfg: &CallscopeConfig,
    out: Option<PathBuf>,
) -> Result<()> {
    let dir = out.unwrap_or_else(|| export::export_dir(&cfg.export));
    let mut board = NoticeBoard::new(std::time::Duration::from_millis(cfg.export.notice_ms));
    let _ = export::export_with_notice(backend, &dir, &mut board);

    if let Some(notice) = board.visible_at(std::time::Instant::now()) {
        match notice.kind {
            NoticeKind::Success => println!("{} {}", "✓".green().bold(), notice.message),
            NoticeKind::Error => eprintln!("{} {}", "✗".red().bold(), notice.message),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared renderers
// ---------------------------------------------------------------------------

fn print_cards(cards: &[StatCard]) {
    for card in cards {
        let value = match card.color {
            Some(color) => paint(&card.value, color).bold(),
            None => card.value.bold(),
        };
        println!("  {:<20} {}", card.label, value);
    }
}

fn print_series(series: &[SeriesPoint]) {
    for point in series {
        println!(
            "  {:<18} {:<width$} {:>5} ({}%)",
            truncate(&point.label, 18),
            paint(&bar(point.pct, BAR_WIDTH), point.color),
            point.count,
            point.pct,
            width = BAR_WIDTH,
        );
    }
}

fn print_rows_table(rows: &[ReportRow]) {
    println!(
        "  {:<30} {:<19} {:<7} {:>10} {:>5}",
        "Call", "Date", "Risk", "Compliance", "Viol."
    );
    println!("  {}", "-".repeat(76));
    for row in rows {
        let risk = format!("{:<7}", row.risk_level.to_string());
        println!(
            "  {:<30} {:<19} {} {:>10} {:>5}",
            truncate(&row.title, 30),
            row.date,
            paint(&risk, row.risk_color),
            row.compliance,
            row.violations,
        );
        println!("  {}", format!("id: {}", row.id).dimmed());
    }
}

fn print_rows_csv(rows: &[ReportRow]) {
    println!("id,title,filename,date,risk_score,risk_level,compliance,violations,duration");
    for r in rows {
        println!(
            "{},{},{},{},{:.1},{},{},{},{}",
            csv_field(&r.id),
            csv_field(&r.title),
            csv_field(&r.filename),
            csv_field(&r.date),
            r.risk_score,
            r.risk_level,
            r.compliance,
            r.violations,
            r.duration,
        );
    }
}
