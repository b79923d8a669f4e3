//! `KpiRuleSet` rule kind: severity-tiered decline thresholds per metric,
//! optional per-entity overrides, and competitor movement rules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use wowpulse_core::{EntityId, Metric, Severity};

use super::metadata::{default_true, CommonMetadata};

pub const API_VERSION: &str = "v1";
pub const KIND: &str = "KpiRuleSet";

/// Top-level KpiRuleSet document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KpiRuleSet {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: KpiRuleSetSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KpiRuleSetSpec {
    /// Evaluated in declared order.
    pub rules: Vec<KpiRule>,
    #[serde(default)]
    pub competitor: CompetitorRules,
}

/// One decline threshold.
///
/// `metric` stays a string here so validation can point at typos; it is
/// parsed into a [`Metric`] when the rule set is compiled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KpiRule {
    pub metric: String,
    /// Negative percent (or points for rate metrics). Fires strictly below.
    pub threshold: f64,
    pub severity: Severity,
    /// minijinja template for the alert message.
    #[serde(default)]
    pub message: Option<String>,
    /// Entity → replacement threshold.
    #[serde(default)]
    pub overrides: IndexMap<EntityId, f64>,
}

impl KpiRule {
    pub fn parsed_metric(&self) -> Option<Metric> {
        self.metric.parse().ok()
    }
}

/// Competitor movement rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompetitorRules {
    /// Minimum absolute ranking change that raises a rank alert.
    #[serde(default = "default_min_rank_change")]
    pub min_rank_change: i64,
    #[serde(default = "default_true")]
    pub alert_on_price_change: bool,
}

fn default_min_rank_change() -> i64 {
    2
}

impl Default for CompetitorRules {
    fn default() -> Self {
        Self {
            min_rank_change: default_min_rank_change(),
            alert_on_price_change: true,
        }
    }
}
