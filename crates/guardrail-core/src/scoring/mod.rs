//! Answer scorers.
//!
//! Each scorer answers one question about the answer:
//!
//! | Scorer | Question |
//! |--------|----------|
//! | Faithfulness | Is the answer grounded in the passages? |
//! | Toxicity | Does the answer carry PII or profanity? |
//!
//! Coverage asks about the question rather than the answer and lives in
//! [`crate::coverage`].

pub mod faithfulness;
pub mod patterns;
pub mod semantic;
pub mod toxicity;

pub use faithfulness::{blended_faithfulness_score, ngram_overlap_score};
pub use patterns::redact_pii;
pub use semantic::{
    EmbeddingError, EmbeddingSimilarity, Embedder, NoopSemanticScorer, SemanticScorer,
};
pub use toxicity::{screen, toxicity_score, ToxicityReport};
