//! Text normalization shared by every scorer.
//!
//! All lexical comparisons in the engine run over the same normalized form:
//! lowercased, punctuation replaced by spaces, whitespace collapsed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lowercase, strip punctuation and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = PUNCT.replace_all(&lower, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Tokenize text by splitting its normalized form on whitespace.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Space-joined windows of `n` consecutive tokens.
///
/// For `n <= 1` the tokens are returned unchanged.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n <= 1 {
        return tokens.to_vec();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Round to 4 decimal places, the precision every score is reported at.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
