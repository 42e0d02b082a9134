//! Question decomposition and coverage scoring.
//!
//! A question is split into atomic sub-questions; coverage is the fraction of
//! them that share vocabulary with at least one of the top-ranked passages.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::retrieval::{LexicalRanker, RetrieverMode};
use crate::text::{normalize, round4, tokens};
use crate::types::Passage;

lazy_static! {
    /// Sentence punctuation and word-bounded conjunction markers.
    static ref SEPARATORS: Regex = Regex::new(
        r"(?i)[;,.?&]|\b(?:and|or|versus|vs|with|without)\b"
    ).unwrap();
}

/// Candidates inspected per sub-question.
const CANDIDATES_PER_SUB_QUESTION: usize = 3;

/// Split a question into normalized, de-duplicated sub-questions.
///
/// Fragments with fewer than two tokens are dropped. When nothing survives
/// the whole normalized question is the only sub-question, even if empty.
pub fn decompose(question: &str) -> Vec<String> {
    let whole = normalize(question);
    let mut seen = HashSet::new();
    let parts: Vec<String> = SEPARATORS
        .split(&question.to_lowercase())
        .map(normalize)
        .filter(|part| part.split_whitespace().count() >= 2)
        .filter(|part| seen.insert(part.clone()))
        .collect();

    if parts.is_empty() {
        vec![whole]
    } else {
        parts
    }
}

/// Coverage of a question by a set of passages.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Supported fraction, rounded to 4 decimals
    pub score: f64,

    /// Sub-questions with no supporting passage, in question order
    pub missing: Vec<String>,

    /// Total sub-questions considered
    pub total: usize,
}

/// Scores how much of a question the passages can answer.
#[derive(Debug, Clone)]
pub struct CoverageScorer {
    /// Shared tokens required for a passage to support a sub-question
    pub min_overlap_tokens: usize,
}

impl CoverageScorer {
    pub fn new() -> Self {
        Self {
            min_overlap_tokens: 1,
        }
    }

    pub fn with_min_overlap(min_overlap_tokens: usize) -> Self {
        Self { min_overlap_tokens }
    }

    /// Score a question against passages, building a fresh index.
    pub fn score(&self, question: &str, passages: &[Passage]) -> CoverageReport {
        self.score_with_ranker(question, passages, &LexicalRanker::new(passages))
    }

    /// Score a question using an index already built over `passages`.
    pub fn score_with_ranker(
        &self,
        question: &str,
        passages: &[Passage],
        ranker: &LexicalRanker,
    ) -> CoverageReport {
        let sub_questions = decompose(question);
        if sub_questions.is_empty() {
            return CoverageReport {
                score: 1.0,
                missing: Vec::new(),
                total: 0,
            };
        }

        let total = sub_questions.len();
        let missing: Vec<String> = sub_questions
            .into_iter()
            .filter(|sub| {
                passages.is_empty()
                    || self.best_overlap(sub, passages, ranker) < self.min_overlap_tokens
            })
            .collect();

        let supported = total - missing.len();
        CoverageReport {
            score: round4(supported as f64 / total as f64),
            missing,
            total,
        }
    }

    /// Largest token overlap between a sub-question and its top candidates.
    fn best_overlap(&self, sub_question: &str, passages: &[Passage], ranker: &LexicalRanker) -> usize {
        let wanted: HashSet<String> = tokens(sub_question).into_iter().collect();

        ranker
            .top_ids(sub_question, RetrieverMode::Hybrid, CANDIDATES_PER_SUB_QUESTION)
            .into_iter()
            .filter_map(|idx| passages.get(idx))
            .map(|passage| {
                tokens(&passage.text)
                    .into_iter()
                    .collect::<HashSet<_>>()
                    .intersection(&wanted)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }
}

impl Default for CoverageScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coverage score and missing parts with the default scorer.
pub fn coverage_score(question: &str, passages: &[Passage]) -> (f64, Vec<String>) {
    let report = CoverageScorer::new().score(question, passages);
    (report.score, report.missing)
}
