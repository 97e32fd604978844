//! `callscope scan <file>`: local transcript checks.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{OutputFormat, csv_field, risk_badge, truncate};
use crate::scan::{self, ScanReport};

pub fn run_scan(path: &Path, format: OutputFormat) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let report = scan::scan(&text);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => print_scan_csv(&report),
        OutputFormat::Table => print_scan_table(&report, path),
    }
    Ok(())
}

fn print_scan_table(report: &ScanReport, path: &Path) {
    println!("{}", "Transcript Scan".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {:<12} {}", "File".bold(), path.display());
    println!("  {:<12} {}", "Risk".bold(), risk_badge(report.risk_level));
    println!();

    println!("{}", format!("PII ({})", report.pii_count).bold().cyan());
    if report.pii.is_empty() {
        println!("  {}", "None found.".green());
    }
    for f in &report.pii {
        println!("  {:<16} {}", f.kind.red(), f.value);
    }
    println!();

    if !report.profanity.is_empty() {
        println!("{}", "Prohibited Language".bold().cyan());
        for p in &report.profanity {
            println!(
                "  {:<8} {}",
                risk_badge(p.severity).to_string(),
                p.value
            );
        }
        println!();
    }

    if !report.financial.is_empty() {
        println!("{}", "Financial Entities".bold().cyan());
        for f in &report.financial {
            println!("  {:<16} {}", f.kind, f.value);
        }
        println!();
    }

    if !report.obligations.is_empty() {
        println!("{}", "Obligations".bold().cyan());
        for o in &report.obligations {
            println!("  • {}", truncate(&o.sentence, 100));
            println!("      {}", o.keywords.join(", ").dimmed());
        }
    }
}

fn print_scan_csv(report: &ScanReport) {
    println!("category,kind,value,start");
    for f in &report.pii {
        println!("pii,{},{},{}", f.kind, csv_field(&f.value), f.start);
    }
    for f in &report.financial {
        println!("financial,{},{},{}", f.kind, csv_field(&f.value), f.start);
    }
    for p in &report.profanity {
        println!("profanity,{},{},{}", p.severity, csv_field(&p.value), p.start);
    }
    for o in &report.obligations {
        println!("obligation,{},{},{}", csv_field(&o.keywords.join(";")), csv_field(&o.sentence), o.start);
    }
}
