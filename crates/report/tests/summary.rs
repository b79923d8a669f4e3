use chrono::{TimeZone, Utc};
use serde_json::json;

use wowpulse_core::{
    Alert, ClassificationStats, DeltaResult, EngineConfig, EntityComparison, Metric, MetricDeltas,
    PeriodKpiRecord, Severity, TrendDirection,
};
use wowpulse_report::{ReportComposer, ReportInput};

fn result(metric: Metric, current: f64, delta: Option<f64>) -> DeltaResult {
    DeltaResult {
        metric,
        current_value: Some(current),
        previous_value: None,
        delta,
        trend: if delta.is_some() {
            TrendDirection::Down
        } else {
            TrendDirection::Unknown
        },
    }
}

fn input(entities: &[&str]) -> ReportInput {
    let deltas: MetricDeltas = [
        (Metric::Revenue, result(Metric::Revenue, 100000.0, Some(-25.0))),
        (Metric::Orders, result(Metric::Orders, 50.0, None)),
    ]
    .into_iter()
    .collect();
    ReportInput {
        now: Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
        aggregate: deltas.clone(),
        entities: entities
            .iter()
            .map(|id| EntityComparison {
                entity_id: (*id).into(),
                current: PeriodKpiRecord::default(),
                previous: None,
                deltas: deltas.clone(),
            })
            .collect(),
        alerts: vec![Alert {
            severity: Severity::Critical,
            entity_id: "minix".into(),
            metric: Metric::Revenue,
            delta: -25.0,
            threshold: -20.0,
            message: "Revenue down 25.0% vs last week".into(),
        }],
        products: Vec::new(),
        competitor_alerts: Vec::new(),
        diagnostics: ClassificationStats {
            total: 2,
            current: 2,
            ..Default::default()
        },
    }
}

#[test]
fn summary_serializes_camel_case() {
    let composer = ReportComposer::new(&EngineConfig::new(["minix", "thome"])).unwrap();
    let report = composer.compose(input(&["minix", "thome"]));

    let summary = serde_json::to_value(report.summary()).unwrap();
    assert_eq!(
        summary,
        json!({
            "date": "2026-05-04",
            "hasData": true,
            "revenue": 100000.0,
            "orders": 50.0,
            "wowRevenue": -25.0,
            "wowOrders": null,
            "alertsCount": 1,
            "hasAnomaly": true,
            "entityIds": ["minix", "thome"],
        })
    );
}

#[test]
fn no_data_summary_is_empty() {
    let composer = ReportComposer::new(&EngineConfig::new(["minix"])).unwrap();
    let report = composer.compose(input(&[]));
    let summary = report.summary();

    assert!(!summary.has_data);
    assert_eq!(summary.revenue, None);
    assert_eq!(summary.alerts_count, 0);
    assert!(!summary.has_anomaly);
    assert!(summary.entity_ids.is_empty());
    assert_eq!(report.diagnostics.current, 2);
}

#[test]
fn unsupported_locale_rejected() {
    let mut config = EngineConfig::new(["minix"]);
    config.currency_locale = "fr-FR".into();
    assert!(ReportComposer::new(&config).is_err());
}
