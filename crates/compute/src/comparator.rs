//! Week-over-week delta arithmetic.
//!
//! All functions are total: a zero, missing or non-finite baseline yields an
//! undefined delta (`None`), never `0%`, infinity or a panic.

use wowpulse_core::{
    DeltaKind, DeltaResult, EntityComparison, Metric, MetricDeltas, PeriodKpiRecord,
    TrendDirection,
};

use crate::classifier::Partitions;

/// Relative change in percent: `(current - previous) / previous * 100`.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (finite(current), finite(previous)) {
        // Scale before dividing so exact boundaries stay exact (80 vs 100 is -20.0).
        (Some(c), Some(p)) if p != 0.0 => Some((c - p) * 100.0 / p),
        _ => None,
    }
}

/// Plain difference, for metrics that are already rates.
pub fn point_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(finite(current)? - finite(previous)?)
}

pub fn trend(delta: Option<f64>) -> TrendDirection {
    match delta {
        Some(d) if d > 0.0 => TrendDirection::Up,
        Some(d) if d < 0.0 => TrendDirection::Down,
        Some(_) => TrendDirection::Flat,
        None => TrendDirection::Unknown,
    }
}

/// Compare one metric, picking percent or point arithmetic by metric.
pub fn compare(metric: Metric, current: Option<f64>, previous: Option<f64>) -> DeltaResult {
    let delta = match metric.delta_kind() {
        DeltaKind::Percent => delta(current, previous),
        DeltaKind::Points => point_delta(current, previous),
    };
    DeltaResult {
        metric,
        current_value: current,
        previous_value: previous,
        delta,
        trend: trend(delta),
    }
}

/// Deltas for every metric, in `Metric::ALL` order.
pub fn compare_records(current: &PeriodKpiRecord, previous: Option<&PeriodKpiRecord>) -> MetricDeltas {
    Metric::ALL
        .into_iter()
        .map(|metric| {
            let prev = previous.and_then(|p| p.value(metric));
            (metric, compare(metric, current.value(metric), prev))
        })
        .collect()
}

/// Pair one entity's current record with its comparison record.
///
/// A comparison record without a positive order count is treated as absent,
/// so every delta of the entity is undefined.
pub fn compare_entity(current: &PeriodKpiRecord, previous: Option<&PeriodKpiRecord>) -> EntityComparison {
    let previous = previous.filter(|p| p.has_volume());
    EntityComparison {
        entity_id: current.entity_id.clone(),
        current: current.clone(),
        previous: previous.cloned(),
        deltas: compare_records(current, previous),
    }
}

/// One comparison per current-period entity, in encounter order.
///
/// Comparison records with no current counterpart are not reported.
pub fn compare_entities(parts: &Partitions) -> Vec<EntityComparison> {
    parts
        .current
        .iter()
        .map(|(id, current)| compare_entity(current, parts.comparison.get(id)))
        .collect()
}

/// Aggregate deltas across entities.
///
/// Each period is summed on its own: every current record feeds the current
/// totals and every comparison record with a positive order count feeds the
/// comparison totals, whether or not the entity appears in the other period.
/// One delta is then taken of the two sums. Average order value and
/// conversion rate use the order-weighted mean of the per-entity values.
pub fn aggregate(parts: &Partitions) -> MetricDeltas {
    let current: Vec<&PeriodKpiRecord> = parts.current.values().collect();
    let previous: Vec<&PeriodKpiRecord> = parts
        .comparison
        .values()
        .filter(|p| p.has_volume())
        .collect();

    let current_totals = totals(&current);
    let previous_totals = Some(totals(&previous)).filter(PeriodKpiRecord::has_volume);
    compare_records(&current_totals, previous_totals.as_ref())
}

/// Collapse records into one synthetic total record.
pub fn totals(records: &[&PeriodKpiRecord]) -> PeriodKpiRecord {
    PeriodKpiRecord {
        total_revenue: sum(records, Metric::Revenue),
        total_orders: sum(records, Metric::Orders),
        avg_order_value: weighted_mean(records, Metric::AvgOrderValue),
        conversion_rate: weighted_mean(records, Metric::ConversionRate),
        ..Default::default()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Sum of present values; `None` when no record has one.
fn sum(records: &[&PeriodKpiRecord], metric: Metric) -> Option<f64> {
    records
        .iter()
        .filter_map(|r| finite(r.value(metric)))
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Mean weighted by order count. A single contributing value is returned
/// as is, even without orders.
fn weighted_mean(records: &[&PeriodKpiRecord], metric: Metric) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| {
            let value = finite(r.value(metric))?;
            let weight = finite(r.total_orders).filter(|w| *w > 0.0).unwrap_or(0.0);
            Some((value, weight))
        })
        .collect();

    match pairs.as_slice() {
        [] => None,
        [(value, _)] => Some(*value),
        _ => {
            let weight: f64 = pairs.iter().map(|(_, w)| w).sum();
            (weight > 0.0).then(|| pairs.iter().map(|(v, w)| v * w).sum::<f64>() / weight)
        }
    }
}
