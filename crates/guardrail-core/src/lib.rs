//! # guardrail-core
//!
//! Deterministic answer-quality and safety evaluation for RAG pipelines.
//!
//! Given a question, a generated answer and the passages it should be
//! grounded in, this crate answers:
//! - Is the answer supported by the passages? (faithfulness)
//! - Does it address every part of the question? (coverage)
//! - Does it carry PII or profanity? (toxicity)
//!
//! and routes the answer to ALLOW, REPAIR or BLOCK under a [`Policy`].
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No model calls by default**: Scoring is lexical unless a [`SemanticScorer`] is injected
//! 3. **Additive repair**: A repaired answer always starts with the original answer
//! 4. **Infallible**: Empty or odd inputs degrade scores instead of failing
//!
//! ## Example
//!
//! ```rust,ignore
//! use guardrail_core::{evaluate, Decision, Passage, Policy};
//!
//! let policy = Policy::from_yaml_file("policy.yaml")?;
//! let passages = vec![Passage::new("p1", "Paris is the capital of France.")];
//! let result = evaluate("What is the capital of France?", "Paris.", &passages, &policy);
//!
//! match result.decision {
//!     Decision::Allow => println!("OK"),
//!     Decision::Repair => println!("{}", result.repaired_answer.unwrap_or_default()),
//!     Decision::Block => println!("BLOCKED: {:?}", result.explanations),
//! }
//! ```

pub mod coverage;
pub mod policy;
pub mod repair;
pub mod retrieval;
pub mod router;
pub mod scoring;
pub mod text;
pub mod types;

// Re-export main types at crate root
pub use coverage::{coverage_score, decompose, CoverageReport, CoverageScorer};
pub use policy::{Policy, PolicyError, RepairConfig, Routes, Thresholds};
pub use repair::{repair_answer, Repair, Repairer};
pub use retrieval::{fused_rank, pick_passages, top_ids, LexicalRanker, RetrieverMode};
pub use router::{route_decision, Router};
pub use scoring::{
    blended_faithfulness_score, ngram_overlap_score, redact_pii, toxicity_score, EmbeddingError,
    EmbeddingSimilarity, Embedder, NoopSemanticScorer, SemanticScorer,
};
pub use types::{Decision, EvaluationRequest, EvaluationResult, Passage, Route, Scores};

/// Evaluate an answer against a policy with lexical scoring only.
///
/// This is the main entry point for Guardrail evaluation.
///
/// # Arguments
///
/// * `question` - The user's question
/// * `answer` - The generated answer to evaluate
/// * `passages` - Retrieved passages, in retrieval order
/// * `policy` - Thresholds, routes and repair settings
///
/// # Returns
///
/// An `EvaluationResult` containing:
/// - `decision`: ALLOW, REPAIR or BLOCK
/// - `scores`: faithfulness, coverage and toxicity
/// - `repaired_answer`: the answer with grounded additions, when repaired
/// - `explanations`: why the answer was not allowed as-is
pub fn evaluate(
    question: &str,
    answer: &str,
    passages: &[Passage],
    policy: &Policy,
) -> EvaluationResult {
    evaluate_with_semantic(question, answer, passages, policy, &NoopSemanticScorer)
}

/// Evaluate with an injected semantic scorer blended into faithfulness.
pub fn evaluate_with_semantic(
    question: &str,
    answer: &str,
    passages: &[Passage],
    policy: &Policy,
    semantic: &dyn SemanticScorer,
) -> EvaluationResult {
    // One index per request, shared by coverage and repair
    let ranker = LexicalRanker::new(passages);

    let coverage = CoverageScorer::new().score_with_ranker(question, passages, &ranker);
    let scores = Scores {
        faithfulness: blended_faithfulness_score(answer, passages, semantic),
        coverage: coverage.score,
        toxicity: toxicity_score(answer),
    };
    tracing::debug!(
        faithfulness = scores.faithfulness,
        coverage = scores.coverage,
        toxicity = scores.toxicity,
        passages = passages.len(),
        sub_questions = coverage.total,
        "Scored answer"
    );

    let (decision, explanations) = Router::new().route(&scores, policy, &coverage.missing);
    tracing::debug!(%decision, reasons = explanations.len(), "Routed answer");

    if decision != Decision::Repair {
        return EvaluationResult {
            decision,
            scores,
            repaired_answer: None,
            explanations,
            missing_parts: coverage.missing,
        };
    }

    let repair =
        Repairer::new(&policy.repair).repair(question, answer, passages, &ranker, &coverage.missing);
    tracing::debug!(
        applied = repair.applied,
        missing_parts = repair.missing_parts.len(),
        "Repair finished"
    );

    EvaluationResult {
        decision,
        scores,
        repaired_answer: repair.applied.then_some(repair.answer),
        explanations,
        missing_parts: coverage.missing,
    }
}

impl EvaluationRequest {
    /// Evaluate this request with lexical scoring only.
    pub fn evaluate(&self, policy: &Policy) -> EvaluationResult {
        evaluate(&self.question, &self.answer, &self.passages, policy)
    }

    /// Evaluate this request with an injected semantic scorer.
    pub fn evaluate_with_semantic(
        &self,
        policy: &Policy,
        semantic: &dyn SemanticScorer,
    ) -> EvaluationResult {
        evaluate_with_semantic(&self.question, &self.answer, &self.passages, policy, semantic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital_passages() -> Vec<Passage> {
        vec![
            Passage::new("p1", "Paris is the capital and largest city of France.").with_source("atlas"),
            Passage::new("p2", "Berlin is the capital of Germany.").with_source("atlas"),
        ]
    }

    #[test]
    fn test_grounded_answer_is_allowed() {
        let result = evaluate(
            "What is the capital of France?",
            "Paris is the capital and largest city of France.",
            &capital_passages(),
            &Policy::default(),
        );
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.scores.faithfulness, 1.0);
        assert_eq!(result.scores.coverage, 1.0);
        assert!(result.explanations.is_empty());
        assert!(result.repaired_answer.is_none());
    }

    #[test]
    fn test_pii_is_blocked() {
        let result = evaluate(
            "What is the capital of France?",
            "Paris. Write to mayor@paris.fr for details.",
            &capital_passages(),
            &Policy::default(),
        );
        assert!(result.is_blocked());
        assert_eq!(result.explanations, vec!["Toxic/PII content detected"]);
        assert!(result.repaired_answer.is_none());
    }

    #[test]
    fn test_ungrounded_answer_is_repaired() {
        let answer = "Probably Lyon.";
        let result = evaluate(
            "What is the capital of France?",
            answer,
            &capital_passages(),
            &Policy::default(),
        );
        assert!(result.needs_repair());
        assert!(result.explanations[0].starts_with("Faithfulness 0.0 < 0.5"));
        let repaired = result.repaired_answer.unwrap();
        assert!(repaired.starts_with(answer));
        assert!(repaired.contains("[atlas:p1]"));
    }

    #[test]
    fn test_no_passages_degrades_scores() {
        let result = evaluate("What is the capital of France?", "Paris.", &[], &Policy::default());
        assert_eq!(result.scores.faithfulness, 0.0);
        assert_eq!(result.scores.coverage, 0.0);
        assert_eq!(result.decision, Decision::Repair);
        assert!(result.repaired_answer.is_none());
        assert_eq!(result.missing_parts, vec!["what is the capital of france"]);
    }

    #[test]
    fn test_punctuation_only_question_is_repaired() {
        let result = evaluate(
            "?!",
            "Paris is the capital and largest city of France.",
            &capital_passages(),
            &Policy::default(),
        );
        assert_eq!(result.scores.faithfulness, 1.0);
        assert_eq!(result.scores.coverage, 0.0);
        assert_eq!(result.missing_parts, vec![""]);
        assert_eq!(result.decision, Decision::Repair);
    }

    #[test]
    fn test_semantic_scorer_changes_faithfulness() {
        struct Always(f64);
        impl SemanticScorer for Always {
            fn score(&self, _answer: &str, _passages: &[Passage]) -> Option<f64> {
                Some(self.0)
            }
        }

        let request = EvaluationRequest {
            question: "What is the capital of France?".to_string(),
            answer: "Probably Lyon.".to_string(),
            passages: capital_passages(),
        };
        let lexical = request.evaluate(&Policy::default());
        let blended = request.evaluate_with_semantic(&Policy::default(), &Always(1.0));
        assert_eq!(lexical.scores.faithfulness, 0.0);
        assert_eq!(blended.scores.faithfulness, 0.4);
    }
}
