//! Policy parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_policy_schema;
use crate::retrieval::RetrieverMode;
use crate::types::Route;

/// Errors that can occur when loading a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read policy file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Policy does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Policy validation failed: {0}")]
    ValidationError(String),
}

/// Score thresholds that trigger routing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Faithfulness below this is "low"
    pub faithfulness_min: f64,

    /// Coverage below this is "low"
    pub coverage_min: f64,

    /// Toxicity at or above this is "toxic"
    pub toxicity_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            faithfulness_min: 0.5,
            coverage_min: 0.7,
            toxicity_max: 0.04,
        }
    }
}

/// What to do when each threshold is crossed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Routes {
    #[serde(default = "default_toxicity_route")]
    pub on_toxicity: Route,

    #[serde(default = "default_quality_route")]
    pub on_low_faithfulness: Route,

    #[serde(default = "default_quality_route")]
    pub on_low_coverage: Route,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            on_toxicity: default_toxicity_route(),
            on_low_faithfulness: default_quality_route(),
            on_low_coverage: default_quality_route(),
        }
    }
}

fn default_toxicity_route() -> Route {
    Route::Block
}

fn default_quality_route() -> Route {
    Route::Repair
}

/// How repairs retrieve and stitch grounded content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepairConfig {
    #[serde(default)]
    pub retriever_mode: RetrieverMode,

    /// Passages retrieved for the whole question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Cap on stitched sentences
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,

    /// Retrieve targeted passages for sub-questions the answer skipped
    #[serde(default = "default_true")]
    pub add_missing_parts: bool,

    /// Tag stitched sentences with `[source:id]`
    #[serde(default = "default_true")]
    pub add_citations: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            retriever_mode: RetrieverMode::Hybrid,
            top_k: default_top_k(),
            max_sentences: default_max_sentences(),
            add_missing_parts: true,
            add_citations: true,
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_max_sentences() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Evaluation policy: thresholds, routes and repair settings.
///
/// Loaded once and shared read-only across evaluations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub thresholds: Thresholds,

    #[serde(default)]
    pub routes: Routes,

    #[serde(default)]
    pub repair: RepairConfig,
}

impl Policy {
    /// Parse a policy from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a policy from JSON string.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a policy from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a policy from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a policy file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, PolicyError> {
        validate_policy_schema(&value).map_err(PolicyError::SchemaError)?;
        let policy: Policy = serde_json::from_value(value)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Validate values the schema cannot express or that were set in code.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let thresholds = [
            ("thresholds.faithfulness_min", self.thresholds.faithfulness_min),
            ("thresholds.coverage_min", self.thresholds.coverage_min),
            ("thresholds.toxicity_max", self.thresholds.toxicity_max),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::ValidationError(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.repair.top_k == 0 {
            return Err(PolicyError::ValidationError(
                "repair.top_k must be at least 1".to_string(),
            ));
        }

        if self.repair.max_sentences == 0 {
            return Err(PolicyError::ValidationError(
                "repair.max_sentences must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
