use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "guardrail",
    version,
    about = "Score RAG answers for faithfulness, coverage and toxicity, then allow, repair or block them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one request and print the JSON response
    Evaluate(EvaluateArgs),
    /// Run golden cases and compare decisions
    Goldens(GoldensArgs),
    /// Inspect policy files
    #[command(subcommand)]
    Policy(PolicyCommands),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Request JSON file, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    #[arg(long, env = "GUARDRAIL_POLICY", default_value = "policy.yaml")]
    pub policy: PathBuf,

    #[arg(long, value_enum, env = "GUARDRAIL_MODE", default_value_t = Mode::Enforce)]
    pub mode: Mode,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GoldensArgs {
    /// Directory of `*.json` golden cases
    #[arg(long, default_value = "tests/goldens")]
    pub dir: PathBuf,

    /// Benchmark CSV (`domain,question,answer,passages,expect`) used instead of `--dir`
    #[arg(long)]
    pub csv: Option<PathBuf>,

    #[arg(long, env = "GUARDRAIL_POLICY", default_value = "policy.yaml")]
    pub policy: PathBuf,

    /// Write a markdown report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Validate a policy file and print the effective policy
    Validate(PolicyValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PolicyValidateArgs {
    pub file: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Return the engine's decision
    Enforce,
    /// Always allow, recording what would have been enforced
    Shadow,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Enforce => "enforce",
            Mode::Shadow => "shadow",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["guardrail", "evaluate", "--input", "req.json"]).unwrap();
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.input, PathBuf::from("req.json"));
                assert!(!args.pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_shadow_mode_flag() {
        let cli = Cli::try_parse_from(["guardrail", "evaluate", "--mode", "shadow"]).unwrap();
        match cli.command {
            Commands::Evaluate(args) => assert_eq!(args.mode, Mode::Shadow),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_policy_validate() {
        let cli = Cli::try_parse_from(["guardrail", "policy", "validate", "p.yaml"]).unwrap();
        match cli.command {
            Commands::Policy(PolicyCommands::Validate(args)) => {
                assert_eq!(args.file, PathBuf::from("p.yaml"))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_goldens_csv_flag() {
        let cli = Cli::try_parse_from(["guardrail", "goldens", "--csv", "benchmark.csv"]).unwrap();
        match cli.command {
            Commands::Goldens(args) => {
                assert_eq!(args.csv, Some(PathBuf::from("benchmark.csv")));
                assert_eq!(args.dir, PathBuf::from("tests/goldens"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["guardrail", "evaluate", "--mode", "audit"]).is_err());
    }
}
