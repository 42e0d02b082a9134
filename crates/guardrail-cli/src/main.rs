mod cli;
mod commands;
mod limits;
mod report;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

/// Exit status when a golden case does not match its expected decision.
const GOLDEN_MISMATCH_EXIT: i32 = 3;

fn main() {
    init_tracing();

    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args).map(|_| 0),
        Commands::Goldens(args) => {
            let all_passed = commands::goldens::run(args)?;
            Ok(if all_passed { 0 } else { GOLDEN_MISMATCH_EXIT })
        }
        Commands::Policy(command) => commands::policy::run(command).map(|_| 0),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
