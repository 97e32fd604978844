//! CSV export of all reports.
//!
//! Downloads the service's CSV and writes it to the export directory, then
//! posts the outcome to a [`NoticeBoard`].

pub mod notice;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::activity::logger;
use crate::api::Backend;
use crate::config::schema::ExportConfig;

pub use notice::{Notice, NoticeBoard, NoticeKind};

/// Message posted when an export fails.
pub const FAILURE_MESSAGE: &str = "Export failed. Please try again.";

/// `call_reports_20240105_143000.csv`
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("call_reports_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Where exports land: the configured dir, else the OS downloads dir, else
/// the current directory.
pub fn export_dir(config: &ExportConfig) -> PathBuf {
    let configured = config.dir.trim();
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Fetch the CSV and write it into `dir`. Returns the written path.
pub fn write_export<B: Backend + ?Sized>(
    backend: &B,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let csv = backend.export_csv()?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(export_file_name(now));
    fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Export and record the outcome on `board`.
pub fn export_with_notice<B: Backend + ?Sized>(
    backend: &B,
    dir: &Path,
    board: &mut NoticeBoard,
) -> Result<PathBuf> {
    let result = write_export(backend, dir, Local::now());
    match &result {
        Ok(path) => {
            logger::info(&format!("exported reports to {}", path.display()));
            board.set(
                NoticeKind::Success,
                format!("Reports exported to {}", path.display()),
                Instant::now(),
            );
        }
        Err(e) => {
            logger::error(&format!("export failed: {e:#}"));
            board.set(NoticeKind::Error, FAILURE_MESSAGE, Instant::now());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_local_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(export_file_name(now), "call_reports_20240105_143000.csv");
    }

    #[test]
    fn configured_dir_wins() {
        let config = ExportConfig {
            dir: "/tmp/exports".to_string(),
            ..ExportConfig::default()
        };
        assert_eq!(export_dir(&config), PathBuf::from("/tmp/exports"));
    }
}
