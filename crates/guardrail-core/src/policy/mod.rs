//! Policy parsing and validation.
//!
//! A policy is structured data validated against JSON Schema: thresholds for
//! the three scores, the route taken when each is crossed, and the repair
//! settings. This module handles parsing YAML/JSON policies and validating them.

mod parser;
mod schema;

pub use parser::{Policy, PolicyError, RepairConfig, Routes, Thresholds};
pub use schema::validate_policy_schema;
