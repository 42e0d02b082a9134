//! Faithfulness: how much of the answer is grounded in the passages.
//!
//! Lexical grounding is measured as n-gram overlap between the answer and the
//! concatenated passage text, mixed with a unigram overlap so that paraphrases
//! still earn partial credit.

use std::collections::HashSet;

use super::semantic::SemanticScorer;
use crate::text::{ngrams, round4, tokens};
use crate::types::Passage;

/// Preferred n-gram order.
pub const DEFAULT_ORDER: usize = 3;

const OVERLAP_WEIGHT: f64 = 0.7;
const UNIGRAM_WEIGHT: f64 = 0.3;

const LEXICAL_BLEND: f64 = 0.6;
const SEMANTIC_BLEND: f64 = 0.4;

/// N-gram order for an answer of `token_count` tokens.
///
/// Short answers drop to bigrams (< 3 tokens) and unigrams (< 2 tokens) so
/// they stay scorable. The cut-offs are a tunable heuristic.
pub fn ngram_order(token_count: usize) -> usize {
    match token_count {
        0 | 1 => 1,
        2 => 2,
        _ => DEFAULT_ORDER,
    }
}

/// Fraction of the answer's distinct n-grams present in the context.
fn overlap_ratio(answer: &[String], context: &[String], n: usize) -> f64 {
    let answer_grams: HashSet<String> = ngrams(answer, n).into_iter().collect();
    if answer_grams.is_empty() {
        return 0.0;
    }
    let context_grams: HashSet<String> = ngrams(context, n).into_iter().collect();
    let shared = answer_grams.intersection(&context_grams).count();
    shared as f64 / answer_grams.len() as f64
}

/// All passage texts joined with newlines, in passage order.
pub fn concat_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lexical faithfulness score in `[0, 1]`.
pub fn ngram_overlap_score(answer: &str, passages: &[Passage]) -> f64 {
    let answer_tokens = tokens(answer);
    if answer_tokens.is_empty() {
        return 0.0;
    }
    let context_tokens = tokens(&concat_passages(passages));

    let n = ngram_order(answer_tokens.len());
    let overlap = overlap_ratio(&answer_tokens, &context_tokens, n);
    let unigram = overlap_ratio(&answer_tokens, &context_tokens, 1);

    round4((OVERLAP_WEIGHT * overlap + UNIGRAM_WEIGHT * unigram).clamp(0.0, 1.0))
}

/// Faithfulness blended with a semantic score when one is available.
///
/// Falls back to the lexical score when the scorer reports nothing or a
/// non-finite value.
pub fn blended_faithfulness_score(
    answer: &str,
    passages: &[Passage],
    semantic: &dyn SemanticScorer,
) -> f64 {
    let lexical = ngram_overlap_score(answer, passages);

    match semantic.score(answer, passages) {
        Some(sem) if sem.is_finite() => {
            let sem = sem.clamp(0.0, 1.0);
            round4((LEXICAL_BLEND * lexical + SEMANTIC_BLEND * sem).clamp(0.0, 1.0))
        }
        Some(_) => {
            tracing::debug!("Semantic scorer returned a non-finite value, using lexical score");
            lexical
        }
        None => lexical,
    }
}
