//! Pipeline orchestrator.
//!
//! Wires the stages together for one batch:
//!
//! - **classify**: partition records into KPI periods, products, competitors.
//! - **compare**: per-entity deltas plus the aggregate across entities.
//! - **detect**: decline-threshold and competitor alerts.
//! - **compose**: the final report.
//!
//! An [`Engine`] is built once from validated configuration and holds no
//! state between runs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use wowpulse_core::{EngineConfig, Record};
use wowpulse_report::{Report, ReportComposer, ReportInput};
use wowpulse_rules::{default_rule_set, AnomalyDetector, KpiRuleSet};

use crate::classifier::{classify, classify_tagged_json, classify_untagged, Partitions};
use crate::comparator::{aggregate, compare_entities};
use crate::error::EngineError;

/// Configured week-over-week engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    detector: AnomalyDetector,
    composer: ReportComposer,
}

impl Engine {
    /// Validate `config` and compile `rules` against it.
    ///
    /// Fails before any input is read when either is malformed.
    pub fn new(config: EngineConfig, rules: &KpiRuleSet) -> Result<Self, EngineError> {
        config.validate()?;
        let detector = AnomalyDetector::compile(rules, &config)?;
        let composer = ReportComposer::new(&config)?;
        debug!(
            entities = config.entity_list.len(),
            rules = detector.rules().len(),
            "engine ready"
        );
        Ok(Self {
            config,
            detector,
            composer,
        })
    }

    /// Engine with the built-in `wow-default` rule set.
    pub fn with_default_rules(config: EngineConfig) -> Result<Self, EngineError> {
        let rules = default_rule_set()?;
        Self::new(config, &rules)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one batch of tagged records.
    pub fn run(&self, records: &[Record], now: DateTime<Utc>) -> Report {
        let parts = classify(records, &self.config);
        self.evaluate(parts, now)
    }

    /// Run one batch of tagged records still in JSON form. Values that fail
    /// to decode are counted in the report diagnostics.
    pub fn run_tagged_json(&self, values: &[Value], now: DateTime<Utc>) -> Report {
        let parts = classify_tagged_json(values, &self.config);
        self.evaluate(parts, now)
    }

    /// Run one batch of untagged JSON objects, classified by shape.
    pub fn run_untagged(&self, values: &[Value], now: DateTime<Utc>) -> Report {
        let parts = classify_untagged(values, &self.config);
        self.evaluate(parts, now)
    }

    fn evaluate(&self, parts: Partitions, now: DateTime<Utc>) -> Report {
        let comparisons = compare_entities(&parts);
        let aggregate = aggregate(&parts);
        let alerts = self.detector.detect(&comparisons);
        let competitor_alerts = self.detector.detect_competitors(&parts.competitors);

        debug!(
            entities = comparisons.len(),
            matched = comparisons.iter().filter(|c| c.previous.is_some()).count(),
            comparison_only = parts
                .comparison
                .keys()
                .filter(|id| !parts.current.contains_key(*id))
                .count(),
            alerts = alerts.len(),
            competitor_alerts = competitor_alerts.len(),
            "compared batch"
        );

        let report = self.composer.compose(ReportInput {
            now,
            aggregate,
            entities: comparisons,
            alerts,
            products: parts.products,
            competitor_alerts,
            diagnostics: parts.stats,
        });

        info!(
            date = %report.date_stamp,
            has_data = report.has_data,
            entities = report.per_entity.len(),
            alerts = report.alerts.len(),
            competitor_alerts = report.competitor_alerts.len(),
            rejected = report.diagnostics.rejected(),
            "report composed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use wowpulse_core::{ConfigError, Metric};
    use wowpulse_rules::RuleError;

    use super::*;

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn invalid_config_fails_fast() {
        let err = Engine::with_default_rules(EngineConfig::new(["a", "a"])).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::DuplicateEntity(_))));

        let mut config = EngineConfig::new(["a"]);
        config.per_entity_thresholds.insert(
            "ghost".into(),
            [(Metric::Revenue, -30.0)].into_iter().collect(),
        );
        let err = Engine::with_default_rules(config).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::UnknownOverrideEntity(_))));
    }

    #[test]
    fn invalid_rules_fail_fast() {
        let mut rules = default_rule_set().unwrap();
        rules.spec.rules.clear();
        let err = Engine::new(EngineConfig::single_entity("a"), &rules).unwrap_err();
        assert!(matches!(err, EngineError::Rules(RuleError::Validation(_))));
    }

    #[test]
    fn empty_batch_is_no_data() {
        let engine = Engine::with_default_rules(EngineConfig::single_entity("a")).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let report = engine.run(&[], now);
        assert!(!report.has_data);
        assert_eq!(report.diagnostics.total, 0);
    }
}
