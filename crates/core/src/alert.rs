use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::metric::Metric;

/// Alert severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Warning => "⚠️",
            Severity::Critical => "🚨",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// A KPI rule that fired for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub entity_id: EntityId,
    pub metric: Metric,
    pub delta: f64,
    /// Effective threshold after per-entity overrides.
    pub threshold: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorAlertKind {
    Rank,
    Price,
}

/// A competitor movement worth surfacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAlert {
    pub kind: CompetitorAlertKind,
    pub product_name: String,
    pub source: String,
    pub brand: String,
    pub prev_ranking: Option<i64>,
    pub current_ranking: Option<i64>,
    pub ranking_change: i64,
    pub price_change: f64,
}
