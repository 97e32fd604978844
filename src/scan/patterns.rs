//! Pattern tables for the transcript scan.

use std::sync::LazyLock;

use regex::Regex;

fn compile(name: &'static str, pattern: &str) -> (&'static str, Regex) {
    let re = Regex::new(pattern).unwrap_or_else(|e| panic!("{name} pattern must compile: {e}"));
    (name, re)
}

/// PII detectors, in priority order. When two detectors hit the same span
/// the earlier one names the finding.
pub static PII_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        compile("phone", r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b"),
        compile("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        compile("ssn", r"\b\d{3}[-.\s]?\d{2}[-.\s]?\d{4}\b"),
        compile("credit_card", r"\b(?:\d{4}[-.\s]?){3}\d{4}\b"),
        compile("aadhaar", r"\b\d{4}[-.\s]?\d{4}[-.\s]?\d{4}\b"),
        compile("pan", r"\b[A-Z]{5}\d{4}[A-Z]\b"),
        compile(
            "account_number",
            r"(?i)\b(?:a/?c|account)\s*(?:no\.?|number|#)?\s*:?\s*\d{9,18}\b",
        ),
        compile("phone_ru", r"\+?7[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{2}[-.\s]?\d{2}"),
        compile("passport_ru", r"\b\d{4}\s?\d{6}\b"),
        compile("inn_ru", r"\b\d{10}(?:\d{2})?\b"),
        compile("snils_ru", r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{3}[-.\s]?\d{2}\b"),
    ]
});

pub static FINANCIAL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        compile(
            "currency_amount",
            r"(?i)(?:(?:Rs\.?|INR|USD|\$|€|£|₹)\s*\d[\d,]*(?:\.\d{1,2})?)|(?:\d[\d,]*(?:\.\d{1,2})?\s*(?:rupees|dollars|euros|pounds|lakhs?|crores?|thousand|hundred))",
        ),
        compile(
            "currency_rub",
            r"(?i)(?:\d[\d\s,]*(?:[.,]\d{1,2})?\s*(?:рублей|руб\.?|₽))|(?:\d[\d\s,]*(?:[.,]\d{1,2})?\s*(?:тысяч|миллион(?:ов|а)?|млн)\s*(?:рублей|долларов|евро)?)|(?:\d[\d\s,]*(?:[.,]\d{1,2})?\s*(?:долларов|евро))",
        ),
        compile(
            "percentage",
            r"(?i)\b\d+(?:[.,]\d+)?\s*(?:%|percent\b|per\s*cent\b|процент(?:ов|а)?\b)",
        ),
        compile(
            "date_reference",
            r"(?i)\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4})|(?:(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s*\d{2,4})|(?:\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4})|(?:\d{1,2}\s+(?:января|февраля|марта|апреля|мая|июня|июля|августа|сентября|октября|ноября|декабря)(?:\s*\d{2,4})?)",
        ),
        compile(
            "loan_term",
            r"(?i)\b\d+\s*(?:months?|years?|days?|EMI|installments?|месяц(?:ев|а)?|лет|год(?:а|ов)?|дней|дня)\b",
        ),
    ]
});

/// Matched as whole words, medium severity.
pub const PROFANITY_WORDS: &[&str] = &[
    "damn", "hell", "shit", "fuck", "bastard", "ass", "crap", "idiot", "stupid", "dumb", "moron",
];

/// Matched as substrings of the lowercased text, high severity.
pub const PROHIBITED_PHRASES: &[&str] = &[
    "we will take legal action immediately",
    "your credit score will be ruined",
    "we'll seize your assets",
    "you must decide right now",
    "this is your last chance",
    "don't tell anyone about this offer",
    "zero fees",
    "guaranteed approval",
    "risk-free investment",
];

/// English, Russian and Hindi markers of a commitment or disclosure.
pub const OBLIGATION_KEYWORDS: &[&str] = &[
    "must",
    "shall",
    "required",
    "mandatory",
    "obligated",
    "need to",
    "have to",
    "should",
    "will be charged",
    "agree to",
    "consent",
    "acknowledge",
    "confirm",
    "i promise",
    "we guarantee",
    "committed to",
    "by signing",
    "terms and conditions",
    "cooling off",
    "within 30 days",
    "penalty",
    "fee",
    "interest rate",
    "должен",
    "обязан",
    "необходимо",
    "обещаю",
    "гарантирую",
    "подтверждаю",
    "согласен",
    "обязательно",
    "штраф",
    "комиссия",
    "процент",
    "условия",
    "договор",
    "контракт",
    "в течение",
    "обязуюсь",
    "ответственность",
    "ज़रूरी",
    "अनिवार्य",
    "वादा",
    "सहमत",
    "शर्तें",
];

/// Sentence terminators, including the Devanagari danda.
pub static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?।]+(?:\s+|$)|\n+").expect("sentence regex must compile")
});

pub static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex must compile"));
