use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::schema::KpiRuleSet;
use crate::validation::validate_rule_set;

use super::error::{Result, RuleError};

/// The rule set shipped with the engine.
pub const DEFAULT_RULES_YAML: &str = include_str!("../../../../data/rules/wow-default.yml");

/// Parse and validate a rule set from YAML text.
pub fn load_str(yaml: &str) -> Result<KpiRuleSet> {
    let set: KpiRuleSet = serde_yaml::from_str(yaml)?;
    let validation = validate_rule_set(&set);

    for w in &validation.warnings {
        warn!(rule_set = %set.metadata.id, path = %w.path, "{}", w.message);
    }
    if !validation.valid {
        return Err(RuleError::Validation(validation.error_summary()));
    }
    Ok(set)
}

/// Read, parse and validate a rule set file.
pub fn load_file(path: &Path) -> Result<KpiRuleSet> {
    let yaml = fs::read_to_string(path)?;
    let set = load_str(&yaml)?;
    info!(
        rule_set = %set.metadata.id,
        rules = set.spec.rules.len(),
        path = %path.display(),
        "loaded rule set"
    );
    Ok(set)
}

/// The built-in week-over-week rules: revenue below -20% is critical,
/// orders below -15% and conversion rate below -10 points are warnings.
pub fn default_rule_set() -> Result<KpiRuleSet> {
    load_str(DEFAULT_RULES_YAML)
}
