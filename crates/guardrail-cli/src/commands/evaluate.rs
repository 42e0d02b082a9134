use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use guardrail_core::{redact_pii, Decision, EvaluationRequest, EvaluationResult, Policy};
use serde::Serialize;
use tracing::info;

use crate::cli::{EvaluateArgs, Mode};
use crate::commands::load_policy;
use crate::limits::check_request;

/// Characters of the question kept in the summary log line.
const LOG_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub engine: &'static str,
    pub version: &'static str,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_decision: Option<Decision>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub meta: ResponseMeta,
}

pub fn run(args: EvaluateArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let request: EvaluationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse request: {}", args.input.display()))?;
    check_request(&request).context("request rejected")?;

    let policy = load_policy(&args.policy)?;
    let response = respond(&request, &policy, args.mode);

    info!(
        decision = %response.result.decision,
        shadow_decision = ?response.meta.shadow_decision,
        faithfulness = response.result.scores.faithfulness,
        coverage = response.result.scores.coverage,
        toxicity = response.result.scores.toxicity,
        question_len = request.question.len(),
        answer_len = request.answer.len(),
        passages = request.passages.len(),
        mode = %args.mode,
        question = %redact_pii(&preview(&request.question)),
        "evaluation complete"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("failed to serialize response")?;
    println!("{}", json);
    Ok(())
}

/// Evaluate and wrap the result for output.
///
/// Shadow mode reports `allow` and records the decision that would have
/// been enforced; scores, explanations and any repair are kept.
pub fn respond(request: &EvaluationRequest, policy: &Policy, mode: Mode) -> EvaluateResponse {
    let mut result = request.evaluate(policy);
    let shadow_decision = match mode {
        Mode::Enforce => None,
        Mode::Shadow => {
            let enforced = result.decision;
            if enforced != Decision::Allow {
                info!(shadow_decision = %enforced, "shadow mode: allowing instead");
            }
            result.decision = Decision::Allow;
            Some(enforced)
        }
    };

    EvaluateResponse {
        result,
        meta: ResponseMeta {
            engine: "guardrail-core",
            version: env!("CARGO_PKG_VERSION"),
            mode: mode.to_string(),
            shadow_decision,
        },
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path)
        .with_context(|| format!("failed to read request: {}", path.display()))
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
