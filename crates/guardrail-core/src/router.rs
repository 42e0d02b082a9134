//! Router: maps scores onto an allow/repair/block decision.
//!
//! Rules are applied in a fixed order:
//! 1. Toxicity at or above `toxicity_max` with a `block` route → BLOCK, nothing else is checked
//! 2. Each low score whose route is `repair` adds an explanation
//! 3. No explanations → ALLOW, otherwise → REPAIR
//!
//! A toxicity route other than `block` still records its explanation, so it
//! ends in REPAIR. Low-score routes other than `repair` are not acted on.

use crate::policy::Policy;
use crate::types::{Decision, Route, Scores};

/// Explanation recorded for toxic or PII-bearing answers.
pub const TOXICITY_EXPLANATION: &str = "Toxic/PII content detected";

/// Missing parts quoted in a coverage explanation.
const MISSING_PARTS_SHOWN: usize = 3;

/// The Router turns scores into a decision with explanations.
#[derive(Debug, Clone, Copy)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Route one set of scores.
    ///
    /// # Arguments
    ///
    /// * `scores` - Faithfulness, coverage and toxicity of the answer
    /// * `policy` - Thresholds and routes
    /// * `missing_parts` - Unsupported sub-questions, quoted in the coverage explanation
    pub fn route(
        &self,
        scores: &Scores,
        policy: &Policy,
        missing_parts: &[String],
    ) -> (Decision, Vec<String>) {
        let thresholds = &policy.thresholds;
        let routes = &policy.routes;
        let mut explanations = Vec::new();

        if scores.toxicity >= thresholds.toxicity_max {
            if routes.on_toxicity == Route::Block {
                return (Decision::Block, vec![TOXICITY_EXPLANATION.to_string()]);
            }
            explanations.push(TOXICITY_EXPLANATION.to_string());
        }

        let low_faithfulness = scores.faithfulness < thresholds.faithfulness_min;
        let low_coverage = scores.coverage < thresholds.coverage_min;

        if low_faithfulness && routes.on_low_faithfulness == Route::Repair {
            explanations.push(format!(
                "Faithfulness {} < {}",
                format_value(scores.faithfulness),
                format_value(thresholds.faithfulness_min)
            ));
        }

        if low_coverage && routes.on_low_coverage == Route::Repair {
            let mut message = format!(
                "Coverage {} < {}",
                format_value(scores.coverage),
                format_value(thresholds.coverage_min)
            );
            if !missing_parts.is_empty() {
                message.push_str(&self.missing_suffix(missing_parts));
            }
            explanations.push(message);
        }

        if explanations.is_empty() {
            (Decision::Allow, explanations)
        } else {
            (Decision::Repair, explanations)
        }
    }

    /// ` (missing: a, b, c…)` with an ellipsis when parts were left out.
    fn missing_suffix(&self, missing_parts: &[String]) -> String {
        let shown: Vec<&str> = missing_parts
            .iter()
            .take(MISSING_PARTS_SHOWN)
            .map(String::as_str)
            .collect();
        let ellipsis = if missing_parts.len() > MISSING_PARTS_SHOWN {
            "…"
        } else {
            ""
        };
        format!(" (missing: {}{})", shown.join(", "), ellipsis)
    }
}

/// Plain decimal, keeping `.0` on whole numbers (`0.0`, `0.5371`, `0.00005`).
fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Route scores with the default [`Router`].
pub fn route_decision(
    scores: &Scores,
    policy: &Policy,
    missing_parts: &[String],
) -> (Decision, Vec<String>) {
    Router::new().route(scores, policy, missing_parts)
}
