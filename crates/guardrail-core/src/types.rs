//! Request and result types for Guardrail evaluations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An atomic unit of retrieved supporting text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    /// Identifier used in citations
    pub id: String,

    /// The passage text
    pub text: String,

    /// Optional source tag used in citations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Passage {
    /// Create a passage without a source tag.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: None,
        }
    }

    /// Attach a source tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Citation tag in `[source:id]` form.
    ///
    /// Missing or empty values fall back to `src` and `p`.
    pub fn citation(&self) -> String {
        let source = self
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("src");
        let id = if self.id.is_empty() { "p" } else { &self.id };
        format!("[{}:{}]", source, id)
    }
}

/// A question, the generated answer, and the passages it should be grounded in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRequest {
    pub question: String,

    pub answer: String,

    /// Ordered; order affects tie-breaking and repair ordering
    #[serde(default)]
    pub passages: Vec<Passage>,
}

/// The three diagnostic scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Scores {
    /// How much of the answer is grounded in the passages
    pub faithfulness: f64,

    /// Fraction of sub-questions supported by the passages
    pub coverage: f64,

    /// Heuristic unsafe/PII content score
    pub toxicity: f64,
}

/// Routing decision for an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Deliver the answer as-is
    Allow,

    /// Deliver the answer with grounded additions
    Repair,

    /// Do not deliver the answer
    Block,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Repair => "repair",
            Decision::Block => "block",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(Decision::Allow),
            "repair" => Ok(Decision::Repair),
            "block" => Ok(Decision::Block),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// Policy routes share the decision vocabulary.
pub type Route = Decision;

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub decision: Decision,

    pub scores: Scores,

    /// Present only for `repair` decisions that produced new grounded content
    #[serde(default)]
    pub repaired_answer: Option<String>,

    /// Human-readable reasons, in routing order
    #[serde(default)]
    pub explanations: Vec<String>,

    /// Sub-questions the passages did not support
    #[serde(default)]
    pub missing_parts: Vec<String>,
}

impl EvaluationResult {
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }

    pub fn is_blocked(&self) -> bool {
        self.decision == Decision::Block
    }

    pub fn needs_repair(&self) -> bool {
        self.decision == Decision::Repair
    }
}
