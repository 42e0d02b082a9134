use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use guardrail_core::{Decision, EvaluationRequest, Passage, Policy};
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::GoldensArgs;
use crate::commands::load_policy;
use crate::report::{render_markdown, CaseOutcome, RunStats};

/// A golden case file: `{name, expect, input}`.
#[derive(Debug, Deserialize)]
pub struct GoldenCase {
    pub name: String,
    pub expect: String,
    pub input: EvaluationRequest,
}

/// One row of a benchmark CSV: `domain,question,answer,passages,expect`.
///
/// `passages` holds a JSON array of passages.
#[derive(Debug, Deserialize)]
struct BenchmarkRow {
    #[serde(default)]
    domain: String,
    question: String,
    answer: String,
    #[serde(default)]
    passages: String,
    expect: String,
}

impl BenchmarkRow {
    /// Build the case for 1-based row `index`, named `<domain>_<index>`.
    fn into_case(self, index: usize) -> GoldenCase {
        let domain = match self.domain.trim() {
            "" => "unknown",
            domain => domain,
        };
        let name = format!("{}_{}", domain, index);

        let passages: Vec<Passage> = if self.passages.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.passages).unwrap_or_else(|err| {
                warn!(row = index, error = %err, "unreadable passages, evaluating without them");
                Vec::new()
            })
        };

        GoldenCase {
            name,
            expect: self.expect,
            input: EvaluationRequest {
                question: self.question,
                answer: self.answer,
                passages,
            },
        }
    }
}

/// Returns `true` when every case matched its expected decision.
pub fn run(args: GoldensArgs) -> Result<bool> {
    let (source, cases) = match &args.csv {
        Some(path) => (path, csv_cases(path)?),
        None => (&args.dir, json_cases(&args.dir)?),
    };
    if cases.is_empty() {
        bail!("no golden cases found in {}", source.display());
    }

    let policy = load_policy(&args.policy)?;
    let outcomes = evaluate_cases(cases, &policy)?;

    println!("\nGolden Tests\n------------");
    for outcome in &outcomes {
        let mark = if outcome.passed() { "PASS" } else { "FAIL" };
        println!(
            "{} | {} | {} | expect={} got={}",
            mark, outcome.file, outcome.name, outcome.expect, outcome.result.decision
        );
    }

    let stats = RunStats::collect(&outcomes, &policy.thresholds);
    println!("\nSummary\n-------");
    println!("{}/{} passed", stats.passed, stats.total);
    info!(
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed(),
        "golden run complete"
    );

    if let Some(path) = &args.report {
        let markdown = render_markdown(&stats, Local::now());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, markdown)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(stats.failed() == 0)
}

/// `*.json` files in `dir`, sorted by path.
fn case_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read golden directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list golden directory: {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// JSON cases from `dir`, labelled by file name.
fn json_cases(dir: &Path) -> Result<Vec<(String, GoldenCase)>> {
    case_files(dir)?
        .iter()
        .map(|path| -> Result<(String, GoldenCase)> {
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok((file, load_case(path)?))
        })
        .collect()
}

/// CSV benchmark cases, labelled `case_001`, `case_002`, ...
fn csv_cases(path: &Path) -> Result<Vec<(String, GoldenCase)>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open benchmark: {}", path.display()))?;
    read_csv_cases(file).with_context(|| format!("failed to parse benchmark: {}", path.display()))
}

fn read_csv_cases<R: io::Read>(source: R) -> Result<Vec<(String, GoldenCase)>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut cases = Vec::new();
    for (offset, row) in reader.deserialize::<BenchmarkRow>().enumerate() {
        let index = offset + 1;
        let row = row.with_context(|| format!("invalid benchmark row {}", index))?;
        cases.push((format!("case_{:03}", index), row.into_case(index)));
    }
    Ok(cases)
}

fn evaluate_cases(cases: Vec<(String, GoldenCase)>, policy: &Policy) -> Result<Vec<CaseOutcome>> {
    cases
        .into_iter()
        .map(|(file, case)| -> Result<CaseOutcome> {
            let expect: Decision = case
                .expect
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid expect in {}", file))?;

            Ok(CaseOutcome {
                file,
                name: case.name,
                expect,
                result: case.input.evaluate(policy),
            })
        })
        .collect()
}

fn load_case(path: &Path) -> Result<GoldenCase> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read golden case: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse golden case: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goldens_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/goldens")
    }

    const BENCHMARK: &str = r#"domain,question,answer,passages,expect
general,What is the capital of France?,Paris is the capital and largest city of France.,"[{""id"":""p1"",""text"":""Paris is the capital and largest city of France."",""source"":""geography""}]",allow
health,How to contact support?,Email me at user@example.com.,"[{""id"":""p1"",""text"":""Use official support channels only."",""source"":""policy""}]",block
,What causes rain?,Rain is caused by condensation.,not json,repair
"#;

    #[test]
    fn test_shipped_goldens_pass_with_defaults() {
        let cases = json_cases(&goldens_dir()).unwrap();
        assert!(cases.len() >= 5);

        let outcomes = evaluate_cases(cases, &Policy::default()).unwrap();
        for outcome in &outcomes {
            assert!(
                outcome.passed(),
                "{} expected {} got {}",
                outcome.file,
                outcome.expect,
                outcome.result.decision
            );
        }
    }

    #[test]
    fn test_case_files_are_sorted_json_only() {
        let files = case_files(&goldens_dir()).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert!(files.iter().all(|f| f.extension().unwrap() == "json"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(case_files(Path::new("no/such/goldens")).is_err());
    }

    #[test]
    fn test_csv_rows_become_cases() {
        let cases = read_csv_cases(BENCHMARK.as_bytes()).unwrap();
        let labels: Vec<&str> = cases.iter().map(|(file, _)| file.as_str()).collect();
        assert_eq!(labels, vec!["case_001", "case_002", "case_003"]);

        let names: Vec<&str> = cases.iter().map(|(_, case)| case.name.as_str()).collect();
        assert_eq!(names, vec!["general_1", "health_2", "unknown_3"]);

        assert_eq!(cases[0].1.input.passages[0].source.as_deref(), Some("geography"));
        // unreadable passages degrade to none
        assert!(cases[2].1.input.passages.is_empty());
    }

    #[test]
    fn test_csv_cases_evaluate_to_expected_decisions() {
        let cases = read_csv_cases(BENCHMARK.as_bytes()).unwrap();
        let outcomes = evaluate_cases(cases, &Policy::default()).unwrap();
        assert!(outcomes.iter().all(CaseOutcome::passed));

        let domains: Vec<&str> = outcomes.iter().map(CaseOutcome::domain).collect();
        assert_eq!(domains, vec!["general", "health", "unknown"]);
    }

    #[test]
    fn test_csv_row_missing_columns_is_an_error() {
        assert!(read_csv_cases("question,expect\nWhat?,allow\n".as_bytes()).is_err());
    }
}
