//! Header, rule and competitor checks for `KpiRuleSet` documents.

use std::collections::HashSet;

use wowpulse_core::Metric;

use super::fuzzy::{fuzzy_match, is_kebab_case};
use super::ValidationResult;
use crate::evaluator::check_template;
use crate::schema::{KpiRuleSet, API_VERSION, KIND};

pub(super) fn validate_header(set: &KpiRuleSet, result: &mut ValidationResult) {
    if set.api_version != API_VERSION {
        result.error(
            "apiVersion",
            format!("apiVersion must be '{API_VERSION}', got '{}'", set.api_version),
        );
    }

    if set.kind != KIND {
        result.error("kind", format!("kind must be '{KIND}', got '{}'", set.kind));
    }

    if !is_kebab_case(&set.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                set.metadata.id
            ),
        );
    }

    if !set.metadata.enabled {
        result.warn("metadata.enabled", "rule set is disabled; no KPI alerts will be raised");
    }
}

pub(super) fn validate_rules(set: &KpiRuleSet, result: &mut ValidationResult) {
    if set.spec.rules.is_empty() {
        result.error("spec.rules", "at least one rule is required");
        return;
    }

    let metric_names = Metric::names();
    let mut seen = HashSet::new();

    for (i, rule) in set.spec.rules.iter().enumerate() {
        let path = format!("spec.rules[{i}]");

        match rule.parsed_metric() {
            Some(metric) => {
                if !seen.insert(metric) {
                    result.error(
                        format!("{path}.metric"),
                        format!("metric '{metric}' already has a rule"),
                    );
                }
            }
            None => {
                let message = format!("unknown metric '{}'", rule.metric);
                match fuzzy_match(&rule.metric, &metric_names) {
                    Some(s) => result.error_with_suggestion(format!("{path}.metric"), message, s),
                    None => result.error(format!("{path}.metric"), message),
                }
            }
        }

        if !is_decline(rule.threshold) {
            result.error(
                format!("{path}.threshold"),
                format!("threshold must be a finite negative number, got {}", rule.threshold),
            );
        }

        if let Some(template) = &rule.message {
            if let Err(e) = check_template(template) {
                result.error(format!("{path}.message"), format!("invalid template: {e}"));
            }
        }

        for (entity, &value) in &rule.overrides {
            let override_path = format!("{path}.overrides.{entity}");
            if entity.is_blank() {
                result.error(override_path, "override entity id is blank");
            } else if !is_decline(value) {
                result.error(
                    override_path,
                    format!("override must be a finite negative number, got {value}"),
                );
            }
        }
    }
}

pub(super) fn validate_competitor(set: &KpiRuleSet, result: &mut ValidationResult) {
    if set.spec.competitor.min_rank_change < 1 {
        result.error(
            "spec.competitor.min_rank_change",
            format!(
                "min_rank_change must be at least 1, got {}",
                set.spec.competitor.min_rank_change
            ),
        );
    }
}

fn is_decline(threshold: f64) -> bool {
    threshold.is_finite() && threshold < 0.0
}
