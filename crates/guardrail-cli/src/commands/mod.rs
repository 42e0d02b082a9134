pub mod evaluate;
pub mod goldens;
pub mod policy;

use std::path::Path;

use anyhow::{Context, Result};
use guardrail_core::Policy;
use tracing::{info, warn};

/// Load the policy at `path`, falling back to built-in defaults when the
/// file does not exist. A file that exists but is invalid is an error.
pub fn load_policy(path: &Path) -> Result<Policy> {
    if !path.exists() {
        warn!(path = %path.display(), "policy file not found, using built-in defaults");
        return Ok(Policy::default());
    }

    let policy = Policy::from_file(path)
        .with_context(|| format!("failed to load policy: {}", path.display()))?;
    info!(
        path = %path.display(),
        faithfulness_min = policy.thresholds.faithfulness_min,
        coverage_min = policy.thresholds.coverage_min,
        toxicity_max = policy.thresholds.toxicity_max,
        retriever_mode = %policy.repair.retriever_mode,
        "loaded policy"
    );
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_policy_uses_defaults() {
        let policy = load_policy(Path::new("definitely/not/here/policy.yaml")).unwrap();
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn test_invalid_policy_is_an_error() {
        let path = std::env::temp_dir().join(format!("guardrail-bad-policy-{}.yaml", std::process::id()));
        fs::write(&path, "thresholds: {faithfulness_min: 2.0, coverage_min: 0.7, toxicity_max: 0.04}\n").unwrap();
        let result = load_policy(&path);
        let _ = fs::remove_file(&path);
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("does not match schema"));
    }
}
