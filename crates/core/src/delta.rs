use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::metric::Metric;
use crate::record::PeriodKpiRecord;

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
    /// The delta could not be computed.
    Unknown,
}

impl TrendDirection {
    pub fn icon(self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Flat => "→",
            TrendDirection::Unknown => "",
        }
    }
}

/// Outcome of comparing one metric across two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaResult {
    pub metric: Metric,
    pub current_value: Option<f64>,
    pub previous_value: Option<f64>,
    /// Percent change, or point difference for rate metrics.
    /// `None` when the baseline is zero or missing.
    pub delta: Option<f64>,
    pub trend: TrendDirection,
}

/// Deltas keyed by metric, in `Metric::ALL` order.
pub type MetricDeltas = IndexMap<Metric, DeltaResult>;

/// One entity's current record paired with its comparison record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityComparison {
    pub entity_id: EntityId,
    pub current: PeriodKpiRecord,
    pub previous: Option<PeriodKpiRecord>,
    pub deltas: MetricDeltas,
}

impl EntityComparison {
    pub fn delta(&self, metric: Metric) -> Option<f64> {
        self.deltas.get(&metric).and_then(|d| d.delta)
    }
}
