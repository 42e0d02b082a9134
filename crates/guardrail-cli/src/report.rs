//! Markdown report for golden runs.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Local};
use guardrail_core::{Decision, EvaluationResult, Thresholds};

/// One evaluated golden case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub file: String,
    pub name: String,
    pub expect: Decision,
    pub result: EvaluationResult,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.expect == self.result.decision
    }

    /// Name prefix before the first `_`, or `unknown`.
    pub fn domain(&self) -> &str {
        match self.name.split_once('_') {
            Some((domain, _)) if !domain.is_empty() => domain,
            _ => "unknown",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DomainStats {
    pub total: usize,
    pub passed: usize,
}

/// Aggregates over a golden run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub total: usize,
    pub passed: usize,
    pub faithfulness_avg: f64,
    pub coverage_avg: f64,
    pub toxicity_avg: f64,
    pub decisions: BTreeMap<Decision, usize>,
    /// Cases with faithfulness at or above `faithfulness_min`
    pub faithfulness_at_threshold: usize,
    /// Cases with coverage at or above `coverage_min`
    pub coverage_at_threshold: usize,
    pub by_domain: BTreeMap<String, DomainStats>,
}

impl RunStats {
    pub fn collect(outcomes: &[CaseOutcome], thresholds: &Thresholds) -> Self {
        let mut decisions: BTreeMap<Decision, usize> =
            [Decision::Allow, Decision::Repair, Decision::Block]
                .into_iter()
                .map(|d| (d, 0))
                .collect();
        let mut by_domain: BTreeMap<String, DomainStats> = BTreeMap::new();
        let (mut faith_sum, mut cov_sum, mut tox_sum) = (0.0, 0.0, 0.0);
        let (mut faith_ok, mut cov_ok, mut passed) = (0, 0, 0);

        for outcome in outcomes {
            let scores = &outcome.result.scores;
            faith_sum += scores.faithfulness;
            cov_sum += scores.coverage;
            tox_sum += scores.toxicity;
            if scores.faithfulness >= thresholds.faithfulness_min {
                faith_ok += 1;
            }
            if scores.coverage >= thresholds.coverage_min {
                cov_ok += 1;
            }
            *decisions.entry(outcome.result.decision).or_insert(0) += 1;

            let domain = by_domain.entry(outcome.domain().to_string()).or_default();
            domain.total += 1;
            if outcome.passed() {
                passed += 1;
                domain.passed += 1;
            }
        }

        let mean = |sum: f64| {
            if outcomes.is_empty() {
                0.0
            } else {
                sum / outcomes.len() as f64
            }
        };

        Self {
            total: outcomes.len(),
            passed,
            faithfulness_avg: mean(faith_sum),
            coverage_avg: mean(cov_sum),
            toxicity_avg: mean(tox_sum),
            decisions,
            faithfulness_at_threshold: faith_ok,
            coverage_at_threshold: cov_ok,
            by_domain,
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.decisions.get(&decision).copied().unwrap_or(0)
    }

    /// `count / total` as a fraction, 0 for an empty run.
    pub fn rate(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Render the run as a markdown report.
pub fn render_markdown(stats: &RunStats, generated_at: DateTime<Local>) -> String {
    let mut md = String::from("# RAG Guardrail Evaluation Report\n\n");
    let _ = writeln!(md, "Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S"));

    md.push_str("## Summary\n\n");
    let _ = writeln!(md, "- **Total Cases**: {}", stats.total);
    let _ = writeln!(md, "- **Passed**: {} ({})", stats.passed, percent(stats.rate(stats.passed)));
    let _ = writeln!(md, "- **Failed**: {} ({})\n", stats.failed(), percent(stats.rate(stats.failed())));

    md.push_str("## Metrics\n\n");
    let _ = writeln!(md, "- **Faithfulness (avg)**: {:.3}", stats.faithfulness_avg);
    let _ = writeln!(md, "- **Coverage (avg)**: {:.3}", stats.coverage_avg);
    let _ = writeln!(md, "- **Toxicity (avg)**: {:.3}\n", stats.toxicity_avg);

    md.push_str("## Decision Breakdown\n\n");
    md.push_str("| Decision | Count | Percentage |\n");
    md.push_str("|----------|-------|------------|\n");
    for (decision, count) in &stats.decisions {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            decision.as_str().to_uppercase(),
            count,
            percent(stats.rate(*count))
        );
    }
    md.push('\n');

    let flagged = stats.count(Decision::Repair) + stats.count(Decision::Block);
    md.push_str("## Rates\n\n");
    let _ = writeln!(md, "- **Hallucination Rate**: {}", percent(stats.rate(flagged)));
    let _ = writeln!(md, "- **Repair Rate**: {}", percent(stats.rate(stats.count(Decision::Repair))));
    let _ = writeln!(md, "- **Block Rate**: {}", percent(stats.rate(stats.count(Decision::Block))));
    let _ = writeln!(
        md,
        "- **Faithfulness @ threshold**: {}",
        percent(stats.rate(stats.faithfulness_at_threshold))
    );
    let _ = writeln!(
        md,
        "- **Coverage @ threshold**: {}\n",
        percent(stats.rate(stats.coverage_at_threshold))
    );

    md.push_str("## Performance by Domain\n\n");
    md.push_str("| Domain | Total | Passed | Pass Rate |\n");
    md.push_str("|--------|-------|--------|-----------|\n");
    for (domain, ds) in &stats.by_domain {
        let rate = if ds.total == 0 {
            0.0
        } else {
            ds.passed as f64 / ds.total as f64
        };
        let _ = writeln!(md, "| {} | {} | {} | {} |", domain, ds.total, ds.passed, percent(rate));
    }
    md.push('\n');

    md
}
