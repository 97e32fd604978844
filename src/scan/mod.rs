//! Local transcript scan.
//!
//! Runs the deterministic text checks over a transcript without the remote
//! service: regex PII, financial entities, profanity and prohibited phrases,
//! and obligation sentences. Offsets are byte offsets into the input.

pub mod patterns;

use std::collections::HashSet;

use serde::Serialize;

use crate::view::format::RiskLevel;

use patterns::{
    FINANCIAL_PATTERNS, OBLIGATION_KEYWORDS, PII_PATTERNS, PROFANITY_WORDS, PROHIBITED_PHRASES,
    SENTENCE_END_RE, WORD_RE,
};

/// PII count above which a transcript is high risk on PII alone.
const PII_HIGH_RISK_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiiFinding {
    pub kind: &'static str,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialEntity {
    pub kind: &'static str,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfanityKind {
    ProhibitedPhrase,
    Profanity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfanityFinding {
    pub kind: ProfanityKind,
    pub value: String,
    pub start: usize,
    pub severity: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationSentence {
    pub sentence: String,
    pub keywords: Vec<&'static str>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub pii: Vec<PiiFinding>,
    pub pii_count: usize,
    pub financial: Vec<FinancialEntity>,
    pub profanity: Vec<ProfanityFinding>,
    pub obligations: Vec<ObligationSentence>,
    pub risk_level: RiskLevel,
}

// ---------------------------------------------------------------------------
// Detectors
// ---------------------------------------------------------------------------

/// Regex PII. One finding per span, ordered by position.
pub fn detect_pii(text: &str) -> Vec<PiiFinding> {
    let mut findings: Vec<PiiFinding> = PII_PATTERNS
        .iter()
        .flat_map(|(kind, re)| {
            re.find_iter(text).map(move |m| PiiFinding {
                kind: *kind,
                value: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
        })
        .collect();
    dedup_spans(&mut findings);
    findings
}

/// Keep the first finding for each `(start, end)` span, then order by
/// position.
fn dedup_spans(findings: &mut Vec<PiiFinding>) {
    let mut seen = HashSet::new();
    findings.retain(|f| seen.insert((f.start, f.end)));
    findings.sort_by_key(|f| (f.start, f.end));
}

pub fn extract_financial(text: &str) -> Vec<FinancialEntity> {
    FINANCIAL_PATTERNS
        .iter()
        .flat_map(|(kind, re)| {
            re.find_iter(text).map(move |m| FinancialEntity {
                kind: *kind,
                value: m.as_str().trim().to_string(),
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

/// Prohibited phrases (first occurrence each, high) then profane words
/// (every occurrence, medium).
pub fn detect_profanity(text: &str) -> Vec<ProfanityFinding> {
    let lower = text.to_lowercase();
    let mut findings: Vec<ProfanityFinding> = PROHIBITED_PHRASES
        .iter()
        .filter_map(|phrase| {
            lower.find(phrase).map(|start| ProfanityFinding {
                kind: ProfanityKind::ProhibitedPhrase,
                value: phrase.to_string(),
                start,
                severity: RiskLevel::High,
            })
        })
        .collect();

    findings.extend(
        WORD_RE
            .find_iter(&lower)
            .filter(|m| PROFANITY_WORDS.contains(&m.as_str()))
            .map(|m| ProfanityFinding {
                kind: ProfanityKind::Profanity,
                value: m.as_str().to_string(),
                start: m.start(),
                severity: RiskLevel::Medium,
            }),
    );
    findings
}

/// Sentences containing at least one obligation keyword as a whole word.
pub fn extract_obligations(text: &str) -> Vec<ObligationSentence> {
    split_sentences(text)
        .into_iter()
        .filter_map(|(start, end)| {
            let sentence = text[start..end].trim();
            let lower = sentence.to_lowercase();
            let keywords: Vec<&'static str> = OBLIGATION_KEYWORDS
                .iter()
                .copied()
                .filter(|kw| contains_word(&lower, kw))
                .collect();
            (!keywords.is_empty()).then(|| ObligationSentence {
                sentence: sentence.to_string(),
                keywords,
                start,
                end,
            })
        })
        .collect()
}

/// Byte ranges of sentences, terminators included.
fn split_sentences(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        if !text[start..m.end()].trim().is_empty() {
            spans.push((start, m.end()));
        }
        start = m.end();
    }
    if !text[start..].trim().is_empty() {
        spans.push((start, text.len()));
    }
    spans
}

/// `needle` occurs in `haystack` with no word character on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// Low by default, medium with any PII, high with a high-severity finding or
/// more than three PII hits.
pub fn summarize_risk(pii_count: usize, profanity: &[ProfanityFinding]) -> RiskLevel {
    let severe = profanity.iter().any(|p| p.severity == RiskLevel::High);
    if severe || pii_count > PII_HIGH_RISK_COUNT {
        RiskLevel::High
    } else if pii_count > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Run every detector over `text`.
pub fn scan(text: &str) -> ScanReport {
    let pii = detect_pii(text);
    let profanity = detect_profanity(text);
    let risk_level = summarize_risk(pii.len(), &profanity);
    ScanReport {
        pii_count: pii.len(),
        pii,
        financial: extract_financial(text),
        profanity,
        obligations: extract_obligations(text),
        risk_level,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(findings: &[PiiFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn detects_phone_and_email() {
        let pii = detect_pii("Call me at 555-123-4567 or mail john.doe@example.com please");
        assert!(kinds(&pii).contains(&"phone"));
        assert!(kinds(&pii).contains(&"email"));
        assert!(pii.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn detects_pan_and_account() {
        let pii = detect_pii("My PAN is ABCDE1234F and account no: 123456789012");
        assert!(kinds(&pii).contains(&"pan"));
        assert!(kinds(&pii).contains(&"account_number"));
    }

    #[test]
    fn dedup_keeps_first_detector_per_span() {
        let mut findings = vec![
            PiiFinding { kind: "ssn", value: "x".into(), start: 10, end: 20 },
            PiiFinding { kind: "phone", value: "y".into(), start: 0, end: 5 },
            PiiFinding { kind: "snils_ru", value: "x".into(), start: 10, end: 20 },
        ];
        dedup_spans(&mut findings);
        assert_eq!(kinds(&findings), ["phone", "ssn"]);
    }

    #[test]
    fn clean_text_has_no_pii() {
        assert!(detect_pii("Thanks for calling, have a nice day.").is_empty());
    }

    #[test]
    fn financial_entities() {
        let found = extract_financial("The fee is $250.50 at 12.5% for 24 months, due 03/15/2024.");
        let kinds: Vec<_> = found.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&"currency_amount"));
        assert!(kinds.contains(&"percentage"));
        assert!(kinds.contains(&"loan_term"));
        assert!(kinds.contains(&"date_reference"));
    }

    #[test]
    fn rouble_amounts() {
        let found = extract_financial("Сумма 5000 рублей");
        assert!(found.iter().any(|f| f.kind == "currency_rub"));
    }

    #[test]
    fn profanity_severity() {
        let found = detect_profanity("This is your last chance, you idiot. Damn.");
        assert_eq!(found[0].kind, ProfanityKind::ProhibitedPhrase);
        assert_eq!(found[0].severity, RiskLevel::High);
        let words: Vec<_> = found[1..].iter().map(|f| f.value.as_str()).collect();
        assert_eq!(words, ["idiot", "damn"]);
        assert!(found[1..].iter().all(|f| f.severity == RiskLevel::Medium));
    }

    #[test]
    fn profanity_needs_whole_word() {
        assert!(detect_profanity("Please pass the assessment").is_empty());
    }

    #[test]
    fn obligations_use_word_boundaries() {
        let text = "You must pay within 30 days. Thanks for calling! Продолжение следует.";
        let found = extract_obligations(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sentence, "You must pay within 30 days.");
        assert_eq!(found[0].keywords, ["must", "within 30 days"]);
    }

    #[test]
    fn obligations_russian_keyword() {
        let found = extract_obligations("Вы должен оплатить штраф. Спасибо.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keywords, ["должен", "штраф"]);
    }

    #[test]
    fn contains_word_boundaries() {
        assert!(contains_word("a fee applies", "fee"));
        assert!(!contains_word("coffee", "fee"));
        assert!(!contains_word("feed", "fee"));
        assert!(contains_word("fee", "fee"));
    }

    #[test]
    fn risk_summary_rules() {
        assert_eq!(summarize_risk(0, &[]), RiskLevel::Low);
        assert_eq!(summarize_risk(1, &[]), RiskLevel::Medium);
        assert_eq!(summarize_risk(3, &[]), RiskLevel::Medium);
        assert_eq!(summarize_risk(4, &[]), RiskLevel::High);
        let phrase = detect_profanity("guaranteed approval");
        assert_eq!(summarize_risk(0, &phrase), RiskLevel::High);
        let word = detect_profanity("crap");
        assert_eq!(summarize_risk(0, &word), RiskLevel::Low);
    }

    #[test]
    fn scan_combines_detectors() {
        let report = scan("Guaranteed approval! Email me at a@b.co. You must sign today.");
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.pii_count, report.pii.len());
        assert!(!report.obligations.is_empty());
    }
}
