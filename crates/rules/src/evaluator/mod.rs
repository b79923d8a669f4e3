//! Rule set compilation and evaluation.
//!
//! [`AnomalyDetector::compile`] resolves a validated [`KpiRuleSet`] against
//! the engine configuration once; [`AnomalyDetector::detect`] is then a pure
//! function from entity comparisons to an ordered alert list.

mod competitor;
mod message;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use wowpulse_core::{
    Alert, CompetitorAlert, CompetitorRecord, EngineConfig, EntityComparison, EntityId,
    EntityLabel, Metric, Severity,
};

use crate::loader::{Result, RuleError};
use crate::schema::KpiRuleSet;
use crate::validation::validate_rule_set;

pub use competitor::CompetitorPolicy;
pub use message::{check_template, MessageContext};

/// A rule with its metric parsed and overrides merged.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub metric: Metric,
    pub threshold: f64,
    pub severity: Severity,
    pub message: Option<String>,
    /// Entity → replacement threshold.
    pub overrides: IndexMap<EntityId, f64>,
}

impl CompiledRule {
    pub fn threshold_for(&self, entity: &EntityId) -> f64 {
        self.overrides.get(entity).copied().unwrap_or(self.threshold)
    }
}

/// Compiled KPI and competitor rules, ready to evaluate.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    rules: Vec<CompiledRule>,
    competitor: CompetitorPolicy,
    labels: IndexMap<EntityId, EntityLabel>,
}

impl AnomalyDetector {
    /// Validate `set` and resolve it against `config`.
    ///
    /// Overrides from the rule document apply first; the configuration's
    /// `per_entity_thresholds` win on conflict. Every override must name a
    /// configured entity.
    pub fn compile(set: &KpiRuleSet, config: &EngineConfig) -> Result<Self> {
        let validation = validate_rule_set(set);
        if !validation.valid {
            return Err(RuleError::Validation(validation.error_summary()));
        }

        let mut rules = Vec::with_capacity(set.spec.rules.len());
        if set.metadata.enabled {
            for rule in &set.spec.rules {
                let metric = rule.metric.parse::<Metric>().map_err(RuleError::Validation)?;
                let mut overrides = IndexMap::new();
                for (entity, &threshold) in &rule.overrides {
                    if !config.contains(entity.as_str()) {
                        return Err(RuleError::Validation(format!(
                            "rule '{metric}' overrides unknown entity '{entity}'"
                        )));
                    }
                    overrides.insert(entity.clone(), threshold);
                }
                for (entity, thresholds) in &config.per_entity_thresholds {
                    if let Some(&threshold) = thresholds.get(&metric) {
                        overrides.insert(entity.clone(), threshold);
                    }
                }
                rules.push(CompiledRule {
                    metric,
                    threshold: rule.threshold,
                    severity: rule.severity,
                    message: rule.message.clone(),
                    overrides,
                });
            }
        } else {
            info!(rule_set = %set.metadata.id, "rule set disabled, KPI alerts off");
        }

        for (entity, thresholds) in &config.per_entity_thresholds {
            for metric in thresholds.keys() {
                if !rules.iter().any(|r| r.metric == *metric) {
                    warn!(entity = %entity, metric = %metric, "threshold override has no matching rule");
                }
            }
        }

        let labels = config
            .entity_list
            .iter()
            .map(|id| (id.clone(), config.label_for(id)))
            .collect();

        debug!(
            rule_set = %set.metadata.id,
            rules = rules.len(),
            competitors = config.track_competitors,
            "compiled rule set"
        );

        Ok(Self {
            rules,
            competitor: CompetitorPolicy::new(
                &set.spec.competitor,
                config.track_competitors,
                config.competitor_alert_limit,
            ),
            labels,
        })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn competitor_policy(&self) -> &CompetitorPolicy {
        &self.competitor
    }

    /// Alerts in rule-then-entity order.
    ///
    /// A rule fires when the entity's delta is defined and strictly below its
    /// effective threshold; landing exactly on the threshold does not fire.
    pub fn detect(&self, comparisons: &[EntityComparison]) -> Vec<Alert> {
        self.rules
            .iter()
            .flat_map(|rule| {
                comparisons
                    .iter()
                    .filter_map(move |cmp| self.evaluate(rule, cmp))
            })
            .collect()
    }

    pub fn detect_competitors(&self, records: &[CompetitorRecord]) -> Vec<CompetitorAlert> {
        self.competitor.evaluate(records)
    }

    fn evaluate(&self, rule: &CompiledRule, cmp: &EntityComparison) -> Option<Alert> {
        let delta = cmp.delta(rule.metric)?;
        let threshold = rule.threshold_for(&cmp.entity_id);
        if delta >= threshold {
            return None;
        }

        let label = self
            .labels
            .get(&cmp.entity_id)
            .cloned()
            .unwrap_or_else(|| EntityLabel::fallback(&cmp.entity_id));
        let ctx = MessageContext::new(cmp.entity_id.as_str(), &label, rule.metric, delta, threshold);
        let message = message::render_message(rule.message.as_deref(), &ctx);

        Some(Alert {
            severity: rule.severity,
            entity_id: cmp.entity_id.clone(),
            metric: rule.metric,
            delta,
            threshold,
            message,
        })
    }
}
