//! Tests for the rule loader module.

use std::fs;

use tempfile::TempDir;

use wowpulse_core::{Metric, Severity};

use super::*;

const VALID_RULE_SET_YAML: &str = r#"
apiVersion: v1
kind: KpiRuleSet
metadata:
  id: test-rules
  name: Test Rules
spec:
  rules:
    - metric: orders
      threshold: -10.0
      severity: critical
"#;

#[test]
fn load_rule_set_from_file() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("rules.yml");
    fs::write(&path, VALID_RULE_SET_YAML).unwrap();

    let set = load_file(&path).unwrap();
    assert_eq!(set.metadata.id, "test-rules");
    assert_eq!(set.metadata.name, "Test Rules");
    assert_eq!(set.spec.rules.len(), 1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().expect("create tempdir");
    let err = load_file(&dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, RuleError::Io(_)));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let err = load_str("spec: [unclosed").unwrap_err();
    assert!(matches!(err, RuleError::Parse(_)));
}

#[test]
fn invalid_rule_set_is_validation_error() {
    let yaml = VALID_RULE_SET_YAML.replace("metric: orders", "metric: oders");
    let err = load_str(&yaml).unwrap_err();
    match err {
        RuleError::Validation(msg) => assert!(msg.contains("did you mean 'orders'"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn default_rule_set_matches_documented_thresholds() {
    let set = default_rule_set().unwrap();
    assert_eq!(set.metadata.id, "wow-default");

    let expected = [
        (Metric::Revenue, -20.0, Severity::Critical),
        (Metric::Orders, -15.0, Severity::Warning),
        (Metric::ConversionRate, -10.0, Severity::Warning),
    ];
    assert_eq!(set.spec.rules.len(), expected.len());
    for (rule, (metric, threshold, severity)) in set.spec.rules.iter().zip(expected) {
        assert_eq!(rule.parsed_metric(), Some(metric));
        assert_eq!(rule.threshold, threshold);
        assert_eq!(rule.severity, severity);
    }
    assert_eq!(set.spec.competitor.min_rank_change, 2);
}
