//! Optional semantic similarity capability for faithfulness scoring.
//!
//! The engine never loads a model itself. Callers inject a [`SemanticScorer`];
//! anything that fails or is unavailable reports `None` and scoring stays
//! purely lexical.

use thiserror::Error;

use crate::types::Passage;

/// Errors from embedding backends.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding failed: {0}")]
    Backend(String),

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Similarity between an answer and its passages, in `[0, 1]`.
///
/// Implementations must not retry and must not panic; `None` means
/// "not available" and the caller falls back to lexical scoring.
pub trait SemanticScorer: Send + Sync {
    fn score(&self, answer: &str, passages: &[Passage]) -> Option<f64>;
}

/// Always reports "unavailable".
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSemanticScorer;

impl SemanticScorer for NoopSemanticScorer {
    fn score(&self, _answer: &str, _passages: &[Passage]) -> Option<f64> {
        None
    }
}

/// A text embedding backend.
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Max cosine similarity between the answer and any passage, rescaled from
/// `[-1, 1]` to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct EmbeddingSimilarity<E> {
    embedder: E,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    fn try_score(&self, answer: &str, passages: &[Passage]) -> Result<Option<f64>, EmbeddingError> {
        let texts: Vec<String> = passages
            .iter()
            .filter(|p| !p.text.is_empty())
            .map(|p| p.text.clone())
            .collect();
        if texts.is_empty() {
            return Ok(None);
        }

        let mut inputs = Vec::with_capacity(texts.len() + 1);
        inputs.push(answer.to_string());
        inputs.extend(texts);

        let vectors = self.embedder.embed(&inputs)?;
        if vectors.len() != inputs.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: inputs.len(),
                actual: vectors.len(),
            });
        }

        let (answer_vec, passage_vecs) = vectors.split_first().ok_or_else(|| {
            EmbeddingError::Backend("empty embedding response".to_string())
        })?;

        let best = passage_vecs
            .iter()
            .filter_map(|v| cosine_similarity(answer_vec, v))
            .fold(None, |acc: Option<f64>, sim| Some(acc.map_or(sim, |a| a.max(sim))));

        Ok(best.map(|sim| ((sim + 1.0) / 2.0).clamp(0.0, 1.0)))
    }
}

impl<E: Embedder> SemanticScorer for EmbeddingSimilarity<E> {
    fn score(&self, answer: &str, passages: &[Passage]) -> Option<f64> {
        match self.try_score(answer, passages) {
            Ok(score) => score,
            Err(e) => {
                tracing::debug!(error = %e, "Semantic scoring unavailable, using lexical score");
                None
            }
        }
    }
}

/// Cosine similarity, `None` for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    sim.is_finite().then_some(sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds each text as its (a-count, b-count) letter histogram.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.matches('a').count() as f32,
                        t.matches('b').count() as f32,
                    ]
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Unavailable("model not loaded".to_string()))
        }
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(vec![vec![1.0]])
        }
    }

    #[test]
    fn test_noop_is_unavailable() {
        assert_eq!(NoopSemanticScorer.score("a", &[Passage::new("p", "a")]), None);
    }

    #[test]
    fn test_max_similarity_rescaled() {
        let scorer = EmbeddingSimilarity::new(LetterEmbedder);
        let passages = vec![Passage::new("p1", "bbb"), Passage::new("p2", "aa")];
        let score = scorer.score("a", &passages).unwrap();
        assert!((score - 1.0).abs() < 1e-9);

        let orthogonal = scorer.score("a", &passages[..1]).unwrap();
        assert!((orthogonal - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_failures_degrade_to_none() {
        let passages = vec![Passage::new("p1", "abc")];
        assert_eq!(EmbeddingSimilarity::new(FailingEmbedder).score("a", &passages), None);
        assert_eq!(EmbeddingSimilarity::new(ShortEmbedder).score("a", &passages), None);
    }

    #[test]
    fn test_no_passage_text_is_unavailable() {
        let scorer = EmbeddingSimilarity::new(LetterEmbedder);
        assert_eq!(scorer.score("a", &[Passage::new("p1", "")]), None);
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
        let opposite = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((opposite + 1.0).abs() < 1e-9);
    }
}
