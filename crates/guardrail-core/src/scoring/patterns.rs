//! Shared detection patterns for PII screening and log redaction.
//!
//! The toxicity screener and `redact_pii` use the same patterns so that what
//! is scored as PII is also what gets masked in log lines.

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::tokens;

lazy_static! {
    // =========================================================================
    // PII DETECTION PATTERNS
    // =========================================================================

    /// Email address pattern (RFC 5322 simplified)
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"
    ).unwrap();

    /// North American phone number, optional country and area code
    pub static ref PHONE_PATTERN: Regex = Regex::new(
        r"\b(?:\+?1[-.\s]?)?(?:\(?\d{3}\)?[-.\s]?)?\d{3}[-.\s]?\d{4}\b"
    ).unwrap();

    /// Social Security Number (XXX-XX-XXXX)
    pub static ref SSN_PATTERN: Regex = Regex::new(
        r"\b\d{3}-\d{2}-\d{4}\b"
    ).unwrap();
}

/// Small, conservative profanity lexicon matched against normalized tokens.
pub const PROFANITY: &[&str] = &["damn", "shit", "bastard"];

/// Check if content contains any email addresses.
pub fn contains_email(content: &str) -> bool {
    EMAIL_PATTERN.is_match(content)
}

/// Check if content contains any phone numbers.
pub fn contains_phone(content: &str) -> bool {
    PHONE_PATTERN.is_match(content)
}

/// Check if content contains any SSN patterns.
pub fn contains_ssn(content: &str) -> bool {
    SSN_PATTERN.is_match(content)
}

/// Check if any token of the content is in the profanity lexicon.
pub fn contains_profanity(content: &str) -> bool {
    tokens(content)
        .iter()
        .any(|token| PROFANITY.contains(&token.as_str()))
}

/// Check if content contains any PII (email, phone, or SSN).
pub fn contains_pii(content: &str) -> bool {
    contains_email(content) || contains_phone(content) || contains_ssn(content)
}

/// Mask emails, phone numbers and SSNs.
///
/// SSNs are masked before phone numbers so their digits are not partially
/// claimed by the looser phone pattern.
pub fn redact_pii(content: &str) -> String {
    let masked = EMAIL_PATTERN.replace_all(content, "[EMAIL_REDACTED]");
    let masked = SSN_PATTERN.replace_all(&masked, "[SSN_REDACTED]");
    PHONE_PATTERN
        .replace_all(&masked, "[PHONE_REDACTED]")
        .into_owned()
}
