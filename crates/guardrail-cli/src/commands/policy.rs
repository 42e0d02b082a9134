use anyhow::{Context, Result};
use guardrail_core::Policy;
use tracing::info;

use crate::cli::{PolicyCommands, PolicyValidateArgs};

pub fn run(command: PolicyCommands) -> Result<()> {
    match command {
        PolicyCommands::Validate(args) => validate(args),
    }
}

fn validate(args: PolicyValidateArgs) -> Result<()> {
    let policy = Policy::from_file(&args.file)
        .with_context(|| format!("invalid policy: {}", args.file.display()))?;
    info!(path = %args.file.display(), "policy is valid");

    let effective = serde_yaml::to_string(&policy).context("failed to render policy")?;
    print!("{}", effective);
    Ok(())
}
