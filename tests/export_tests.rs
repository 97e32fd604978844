/// CSV export and notice tests.
mod common;

use std::fs;
use std::time::{Duration, Instant};

use callscope::export::{self, FAILURE_MESSAGE, NoticeBoard, NoticeKind};
use common::FakeBackend;

#[test]
fn export_writes_csv_and_posts_success() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    let mut board = NoticeBoard::new(Duration::from_millis(4000));

    let path = export::export_with_notice(&backend, dir.path(), &mut board).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), backend.csv);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("call_reports_") && name.ends_with(".csv"));

    let notice = board.visible_at(Instant::now()).unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
}

#[test]
fn export_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("exports").join("calls");
    let backend = FakeBackend::new();
    let mut board = NoticeBoard::new(Duration::from_millis(4000));

    let path = export::export_with_notice(&backend, &nested, &mut board).unwrap();
    assert!(path.starts_with(&nested));
}

#[test]
fn export_failure_posts_generic_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new().failing("export");
    let mut board = NoticeBoard::new(Duration::from_millis(4000));

    assert!(export::export_with_notice(&backend, dir.path(), &mut board).is_err());

    let notice = board.visible_at(Instant::now()).unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, FAILURE_MESSAGE);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
