//! Toxicity and PII screening.
//!
//! An intentionally coarse, conservative heuristic, not a classifier. Each
//! signal counts once regardless of how often it occurs.

use serde::{Deserialize, Serialize};

use super::patterns::{contains_email, contains_phone, contains_profanity, contains_ssn};
use crate::text::round4;

pub const EMAIL_WEIGHT: f64 = 0.04;
pub const PHONE_WEIGHT: f64 = 0.04;
pub const SSN_WEIGHT: f64 = 0.08;
pub const PROFANITY_WEIGHT: f64 = 0.04;

/// Which signals fired and the resulting score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToxicityReport {
    pub email: bool,
    pub phone: bool,
    pub ssn: bool,
    pub profanity: bool,
    pub score: f64,
}

impl ToxicityReport {
    pub fn flagged(&self) -> bool {
        self.email || self.phone || self.ssn || self.profanity
    }
}

/// Screen text for PII and profanity.
pub fn screen(text: &str) -> ToxicityReport {
    let email = contains_email(text);
    let phone = contains_phone(text);
    let ssn = contains_ssn(text);
    let profanity = contains_profanity(text);

    let signals = [
        (email, EMAIL_WEIGHT),
        (phone, PHONE_WEIGHT),
        (ssn, SSN_WEIGHT),
        (profanity, PROFANITY_WEIGHT),
    ];
    let sum: f64 = signals
        .iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, weight)| weight)
        .sum();

    ToxicityReport {
        email,
        phone,
        ssn,
        profanity,
        score: round4(sum).min(1.0),
    }
}

/// Toxicity score in `[0, 1]`.
pub fn toxicity_score(text: &str) -> f64 {
    screen(text).score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let report = screen("Common side-effects include nausea and diarrhea.");
        assert!(!report.flagged());
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_email() {
        assert_eq!(toxicity_score("Email me at user@example.com."), 0.04);
    }

    #[test]
    fn test_email_and_phone() {
        let score = toxicity_score("Write to user@example.com or call 555-123-4567.");
        assert!(score >= 0.08);
        assert_eq!(score, 0.08);
    }

    #[test]
    fn test_presence_not_count() {
        assert_eq!(toxicity_score("a@b.io c@d.io e@f.io"), 0.04);
    }

    #[test]
    fn test_all_signals() {
        let report = screen("Damn, mail x@y.com, call 555-123-4567, SSN 123-45-6789");
        assert!(report.email && report.phone && report.ssn && report.profanity);
        assert_eq!(report.score, 0.2);
    }
}
