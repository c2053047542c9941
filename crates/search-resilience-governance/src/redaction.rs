//! Regex-based redaction of free-text fields (e.g. the raw query string) before they are
//! persisted in an audit record.

use regex::Regex;
use std::sync::OnceLock;

fn ssn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static SSN pattern"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("static email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("static phone pattern")
    })
}

/// Replaces SSNs, email addresses and phone numbers found in `text` with a `[REDACTED:kind]`
/// marker. Order matters: SSN and phone patterns overlap on raw digit runs, so SSNs are
/// matched first.
pub fn redact_text(text: &str) -> String {
    let text = ssn_pattern().replace_all(text, "[REDACTED:ssn]");
    let text = email_pattern().replace_all(&text, "[REDACTED:email]");
    let text = phone_pattern().replace_all(&text, "[REDACTED:phone]");
    text.into_owned()
}
