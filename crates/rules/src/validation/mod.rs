//! Rule set validation with structured errors and suggestions.
//!
//! Returns a [`ValidationResult`] with errors (block loading) and warnings
//! (advisory). Checks run against the raw document, so every problem in a
//! file is reported at once rather than stopping at the first.

mod rule_checks;

pub mod fuzzy;

use serde::{Deserialize, Serialize};

use crate::schema::KpiRuleSet;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `"spec.rules[1].metric"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All errors on one line, for error values and logs.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} (did you mean '{}'?)", e.path, e.message, s),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`KpiRuleSet`].
pub fn validate_rule_set(set: &KpiRuleSet) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_header(set, &mut result);
    rule_checks::validate_rules(set, &mut result);
    rule_checks::validate_competitor(set, &mut result);
    result
}

/// Parse raw YAML and validate. Parse failures are reported as errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<KpiRuleSet>(yaml) {
        Ok(set) => validate_rule_set(&set),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
apiVersion: v1
kind: KpiRuleSet
metadata:
  id: wow-test
  name: Test
spec:
  rules:
    - metric: revenue
      threshold: -20.0
      severity: critical
"#;

    fn paths(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn valid_rule_set_passes() {
        let result = validate_yaml(VALID);
        assert!(result.valid, "{}", result.error_summary());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn shipped_default_is_valid() {
        let result = validate_yaml(include_str!("../../../../data/rules/wow-default.yml"));
        assert!(result.valid, "{}", result.error_summary());
    }

    #[test]
    fn misspelt_metric_gets_suggestion() {
        let result = validate_yaml(&VALID.replace("metric: revenue", "metric: revnue"));
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "spec.rules[0].metric");
        assert_eq!(result.errors[0].suggestion.as_deref(), Some("revenue"));
        assert!(result.error_summary().contains("did you mean 'revenue'"));
    }

    #[test]
    fn positive_threshold_rejected() {
        let result = validate_yaml(&VALID.replace("-20.0", "20.0"));
        assert_eq!(paths(&result), vec!["spec.rules[0].threshold"]);
    }

    #[test]
    fn zero_threshold_rejected() {
        let result = validate_yaml(&VALID.replace("-20.0", "0.0"));
        assert!(!result.valid);
    }

    #[test]
    fn wrong_kind_and_version_rejected() {
        let yaml = VALID
            .replace("kind: KpiRuleSet", "kind: AnomalyRule")
            .replace("apiVersion: v1", "apiVersion: v2");
        let result = validate_yaml(&yaml);
        assert_eq!(paths(&result), vec!["apiVersion", "kind"]);
    }

    #[test]
    fn non_kebab_id_rejected() {
        let result = validate_yaml(&VALID.replace("id: wow-test", "id: Wow_Test"));
        assert_eq!(paths(&result), vec!["metadata.id"]);
    }

    #[test]
    fn duplicate_metric_rejected() {
        let yaml = format!(
            "{VALID}    - metric: revenue\n      threshold: -30.0\n      severity: warning\n"
        );
        let result = validate_yaml(&yaml);
        assert_eq!(paths(&result), vec!["spec.rules[1].metric"]);
    }

    #[test]
    fn empty_rule_list_rejected() {
        let yaml = r#"
apiVersion: v1
kind: KpiRuleSet
metadata: { id: empty, name: Empty }
spec:
  rules: []
"#;
        let result = validate_yaml(yaml);
        assert_eq!(paths(&result), vec!["spec.rules"]);
    }

    #[test]
    fn broken_template_rejected() {
        let yaml = format!("{VALID}      message: \"{{{{ metric \"\n");
        let result = validate_yaml(&yaml);
        assert_eq!(paths(&result), vec!["spec.rules[0].message"]);
    }

    #[test]
    fn override_checks() {
        let yaml = format!("{VALID}      overrides:\n        thome: 5.0\n        \" \": -30.0\n");
        let result = validate_yaml(&yaml);
        assert_eq!(
            paths(&result),
            vec!["spec.rules[0].overrides.thome", "spec.rules[0].overrides. "]
        );
    }

    #[test]
    fn zero_rank_change_rejected() {
        let yaml = format!("{VALID}  competitor:\n    min_rank_change: 0\n");
        let result = validate_yaml(&yaml);
        assert_eq!(paths(&result), vec!["spec.competitor.min_rank_change"]);
    }

    #[test]
    fn disabled_rule_set_warns() {
        let yaml = VALID.replace("name: Test", "name: Test\n  enabled: false");
        let result = validate_yaml(&yaml);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn parse_error_reported() {
        let result = validate_yaml("apiVersion: [");
        assert!(!result.valid);
        assert!(result.errors[0].message.starts_with("YAML parse error"));
    }
}
