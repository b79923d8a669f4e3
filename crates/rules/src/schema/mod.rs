//! YAML DSL schema types with serde deserialization.
//!
//! Rule documents use the `apiVersion / kind / metadata / spec` envelope.
//! The only kind understood by this crate is `KpiRuleSet`.

mod metadata;
mod rule_set;


pub use metadata::CommonMetadata;
pub use rule_set::{CompetitorRules, KpiRule, KpiRuleSet, KpiRuleSetSpec, API_VERSION, KIND};
