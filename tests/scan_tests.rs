/// Transcript scan tests over realistic call text.
use std::fs;

use callscope::cli::OutputFormat;
use callscope::cli::scan::run_scan;
use callscope::scan::{self, ProfanityKind};
use callscope::view::format::RiskLevel;

const TRANSCRIPT: &str = "Agent: Thank you for calling. Can I have your email? \
Customer: Sure, it's jane.roe@example.com and my number is 555-867-5309. \
Agent: Your EMI of $1,200 is due 04/01/2024. You must pay within 30 days. \
Customer: Damn, that's a lot.";

#[test]
fn scan_finds_each_category() {
    let report = scan::scan(TRANSCRIPT);

    let pii: Vec<_> = report.pii.iter().map(|f| f.kind).collect();
    assert!(pii.contains(&"email"));
    assert!(pii.contains(&"phone"));
    assert_eq!(report.risk_level, RiskLevel::Medium);

    let financial: Vec<_> = report.financial.iter().map(|f| f.kind).collect();
    assert!(financial.contains(&"currency_amount"));
    assert!(financial.contains(&"date_reference"));

    assert_eq!(report.profanity.len(), 1);
    assert_eq!(report.profanity[0].kind, ProfanityKind::Profanity);

    assert!(
        report
            .obligations
            .iter()
            .any(|o| o.keywords.contains(&"must"))
    );
}

#[test]
fn findings_point_back_into_the_text() {
    let report = scan::scan(TRANSCRIPT);
    for f in &report.pii {
        assert_eq!(&TRANSCRIPT[f.start..f.end], f.value);
    }
    for o in &report.obligations {
        assert!(TRANSCRIPT[o.start..o.end].contains(&o.sentence));
    }
}

#[test]
fn run_scan_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("call.txt");
    fs::write(&path, TRANSCRIPT).unwrap();

    assert!(run_scan(&path, OutputFormat::Json).is_ok());
    assert!(run_scan(&dir.path().join("missing.txt"), OutputFormat::Table).is_err());
}
