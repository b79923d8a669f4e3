//! Week-over-week anomaly rules.
//!
//! This crate provides:
//! - `KpiRuleSet` YAML documents with serde deserialization
//! - Loading and validation with "did you mean" suggestions
//! - Compilation against the engine configuration (per-entity overrides)
//! - Decline-threshold and competitor movement evaluation

pub mod evaluator;
pub mod loader;
pub mod schema;
pub mod validation;

pub use evaluator::{AnomalyDetector, CompetitorPolicy, CompiledRule};
pub use loader::{default_rule_set, load_file, load_str, RuleError};
pub use schema::KpiRuleSet;
pub use validation::{validate_rule_set, validate_yaml, ValidationResult};
