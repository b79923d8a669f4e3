//! Competitor ranking and price movement alerts.

use wowpulse_core::{CompetitorAlert, CompetitorAlertKind, CompetitorRecord};

use crate::schema::CompetitorRules;

/// Compiled competitor rules plus the engine's on/off switch and cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorPolicy {
    pub enabled: bool,
    pub min_rank_change: i64,
    pub alert_on_price_change: bool,
    pub max_alerts: usize,
}

impl CompetitorPolicy {
    pub fn new(rules: &CompetitorRules, enabled: bool, max_alerts: usize) -> Self {
        Self {
            enabled,
            min_rank_change: rules.min_rank_change,
            alert_on_price_change: rules.alert_on_price_change,
            max_alerts,
        }
    }

    /// Alerts in record order, rank before price within a record, capped at
    /// `max_alerts`.
    pub fn evaluate(&self, records: &[CompetitorRecord]) -> Vec<CompetitorAlert> {
        if !self.enabled {
            return Vec::new();
        }
        records
            .iter()
            .flat_map(|r| self.alerts_for(r))
            .take(self.max_alerts)
            .collect()
    }

    fn alerts_for(&self, record: &CompetitorRecord) -> Vec<CompetitorAlert> {
        let change = record.rank_change();
        let mut alerts = Vec::with_capacity(2);
        if change != 0 && change.abs() >= self.min_rank_change {
            alerts.push(alert(CompetitorAlertKind::Rank, record, change));
        }
        if self.alert_on_price_change && record.price_change != 0.0 {
            alerts.push(alert(CompetitorAlertKind::Price, record, change));
        }
        alerts
    }
}

fn alert(kind: CompetitorAlertKind, record: &CompetitorRecord, change: i64) -> CompetitorAlert {
    CompetitorAlert {
        kind,
        product_name: record.product_name.clone(),
        source: record.source.clone(),
        brand: record.brand.clone(),
        prev_ranking: record.prev_ranking,
        current_ranking: record.current_ranking,
        ranking_change: change,
        price_change: record.price_change,
    }
}
