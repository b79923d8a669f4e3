use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use wowpulse_core::{
    Alert, ChannelShare, ClassificationStats, CompetitorAlert, EntityId, EntityLabel, Metric,
    MetricDeltas, ProductRecord,
};

/// One entity's block in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity_id: EntityId,
    pub label: EntityLabel,
    pub deltas: MetricDeltas,
    pub avg_roas: Option<f64>,
    /// At most two, largest share first.
    pub top_channels: Vec<ChannelShare>,
}

/// The composed report for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub date_stamp: NaiveDate,
    pub has_data: bool,
    pub aggregate: MetricDeltas,
    pub per_entity: Vec<EntitySummary>,
    pub alerts: Vec<Alert>,
    pub top_products: Vec<ProductRecord>,
    pub competitor_alerts: Vec<CompetitorAlert>,
    pub rendered_text: String,
    pub diagnostics: ClassificationStats,
    pub generated_at: DateTime<FixedOffset>,
}

impl Report {
    pub fn has_anomaly(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Machine-readable digest for downstream automation.
    pub fn summary(&self) -> ReportSummary {
        let current = |metric: Metric| self.aggregate.get(&metric).and_then(|d| d.current_value);
        let delta = |metric: Metric| self.aggregate.get(&metric).and_then(|d| d.delta);
        ReportSummary {
            date: self.date_stamp.format("%Y-%m-%d").to_string(),
            has_data: self.has_data,
            revenue: current(Metric::Revenue),
            orders: current(Metric::Orders),
            wow_revenue: delta(Metric::Revenue),
            wow_orders: delta(Metric::Orders),
            alerts_count: self.alerts.len(),
            has_anomaly: self.has_anomaly(),
            entity_ids: self.per_entity.iter().map(|e| e.entity_id.clone()).collect(),
        }
    }
}

/// Flat report digest, serialized in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub date: String,
    pub has_data: bool,
    pub revenue: Option<f64>,
    pub orders: Option<f64>,
    pub wow_revenue: Option<f64>,
    pub wow_orders: Option<f64>,
    pub alerts_count: usize,
    pub has_anomaly: bool,
    pub entity_ids: Vec<EntityId>,
}
