//! Deterministic report composition.
//!
//! The composer never reads the clock: the caller passes `now`, and given
//! the same input and configuration the rendered text is byte-identical
//! apart from the trailing timestamp.

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use tracing::debug;

use wowpulse_core::{
    Alert, ClassificationStats, CompetitorAlert, CompetitorAlertKind, ConfigError,
    CurrencyLocale, EngineConfig, EntityComparison, EntityId, EntityLabel, Metric, MetricDeltas,
    ProductRecord,
};

use crate::format::{delta_suffix, format_count, format_currency, format_money, format_rate};
use crate::report::{EntitySummary, Report};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━";
const NO_DATA_MESSAGE: &str = "⚠️ No data for the current period. Check the data source.";
const EMPTY_LEADERBOARD: &str = "No data";
const CHANNELS_PER_ENTITY: usize = 2;

/// Everything one run hands to the composer.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub now: DateTime<Utc>,
    pub aggregate: MetricDeltas,
    /// Per-entity comparisons in encounter order.
    pub entities: Vec<EntityComparison>,
    pub alerts: Vec<Alert>,
    pub products: Vec<ProductRecord>,
    pub competitor_alerts: Vec<CompetitorAlert>,
    pub diagnostics: ClassificationStats,
}

/// Renders reports for one engine configuration.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    title: String,
    locale: CurrencyLocale,
    offset: FixedOffset,
    top_n: usize,
    labels: IndexMap<EntityId, EntityLabel>,
}

impl ReportComposer {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: config.report_title.clone(),
            locale: config.locale()?,
            offset: config.utc_offset()?,
            top_n: config.top_n,
            labels: config.entity_labels.clone(),
        })
    }

    pub fn compose(&self, input: ReportInput) -> Report {
        let generated_at = input.now.with_timezone(&self.offset);
        let date_stamp = generated_at.date_naive();

        let has_data = !input.entities.is_empty()
            && input
                .aggregate
                .get(&Metric::Orders)
                .and_then(|d| d.current_value)
                .is_some_and(|orders| orders > 0.0);

        if !has_data {
            debug!(date = %date_stamp, "no current-period volume, composing NO_DATA report");
            return Report {
                date_stamp,
                has_data: false,
                aggregate: MetricDeltas::new(),
                per_entity: Vec::new(),
                alerts: Vec::new(),
                top_products: Vec::new(),
                competitor_alerts: Vec::new(),
                rendered_text: format!("{}\n\n{NO_DATA_MESSAGE}", self.header(&generated_at)),
                diagnostics: input.diagnostics,
                generated_at,
            };
        }

        let per_entity: Vec<EntitySummary> = input
            .entities
            .iter()
            .map(|cmp| EntitySummary {
                entity_id: cmp.entity_id.clone(),
                label: self.label(&cmp.entity_id),
                deltas: cmp.deltas.clone(),
                avg_roas: cmp.current.avg_roas,
                top_channels: cmp
                    .current
                    .top_channels(CHANNELS_PER_ENTITY)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect();

        let top_products = leaderboard(input.products, self.top_n);

        let mut report = Report {
            date_stamp,
            has_data: true,
            aggregate: input.aggregate,
            per_entity,
            alerts: input.alerts,
            top_products,
            competitor_alerts: input.competitor_alerts,
            rendered_text: String::new(),
            diagnostics: input.diagnostics,
            generated_at,
        };
        report.rendered_text = self.render(&report);
        report
    }

    fn label(&self, id: &EntityId) -> EntityLabel {
        self.labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| EntityLabel::fallback(id))
    }

    fn header(&self, at: &DateTime<FixedOffset>) -> String {
        format!("📊 *{}* | {}", self.title, at.format("%Y-%m-%d"))
    }

    fn render(&self, report: &Report) -> String {
        let mut out = self.header(&report.generated_at);
        out.push_str("\n\n*Key metrics*\n");
        out.push_str(RULE);
        out.push('\n');
        self.render_aggregate(&mut out, &report.aggregate);

        for entity in &report.per_entity {
            out.push('\n');
            self.render_entity(&mut out, entity);
        }

        if !report.alerts.is_empty() {
            out.push_str("\n*🔔 Anomalies*\n");
            for alert in &report.alerts {
                let label = self.label(&alert.entity_id);
                out.push_str(&format!(
                    "{} *{}* {}: {}\n",
                    alert.severity.icon(),
                    alert.severity,
                    label.name,
                    alert.message
                ));
            }
        }

        out.push_str(&format!("\n*🏆 Top {} products*\n", self.top_n));
        if report.top_products.is_empty() {
            out.push_str(EMPTY_LEADERBOARD);
            out.push('\n');
        }
        for (i, product) in report.top_products.iter().enumerate() {
            out.push_str(&format!(
                "{}. *{}*: {} ({} sold)",
                i + 1,
                product.product_name,
                format_currency(product.total_revenue, self.locale),
                format_count(Some(product.units_sold as f64), self.locale)
            ));
            if let Some(rating) = product.rating {
                out.push_str(&format!(" ★{rating:.1}"));
            }
            out.push('\n');
        }

        if !report.competitor_alerts.is_empty() {
            out.push_str("\n*🔍 Competitor watch*\n");
            for alert in &report.competitor_alerts {
                self.render_competitor(&mut out, alert);
            }
        }

        out.push_str(&format!("\n⏰ Generated at {}", report.generated_at.format("%H:%M:%S")));
        out
    }

    fn render_aggregate(&self, out: &mut String, aggregate: &MetricDeltas) {
        for metric in Metric::ALL {
            let Some(result) = aggregate.get(&metric) else {
                continue;
            };
            let (icon, value) = match metric {
                Metric::Revenue => ("💰", format_money(result.current_value, self.locale)),
                Metric::Orders => ("📦", format_count(result.current_value, self.locale)),
                Metric::AvgOrderValue => ("🛒", format_money(result.current_value, self.locale)),
                Metric::ConversionRate => ("📈", format_rate(result.current_value)),
            };
            out.push_str(&format!("{icon} *{}*: {value} {}\n", metric.label(), delta_suffix(result)));
        }
    }

    fn render_entity(&self, out: &mut String, entity: &EntitySummary) {
        out.push_str(&format!("{} *{}*\n", entity.label.emoji, entity.label.name));
        for metric in [Metric::Revenue, Metric::Orders] {
            let Some(result) = entity.deltas.get(&metric) else {
                continue;
            };
            let value = match metric {
                Metric::Revenue => format_money(result.current_value, self.locale),
                _ => format_count(result.current_value, self.locale),
            };
            out.push_str(&format!("• {}: {value} {}\n", metric.label(), delta_suffix(result)));
        }
        if let Some(roas) = entity.avg_roas {
            out.push_str(&format!("• ROAS: {roas:.2}\n"));
        }
        if !entity.top_channels.is_empty() {
            let channels: Vec<String> = entity
                .top_channels
                .iter()
                .map(|c| format!("{} {:.1}%", c.channel, c.share_pct))
                .collect();
            out.push_str(&format!("• Channels: {}\n", channels.join(", ")));
        }
    }

    fn render_competitor(&self, out: &mut String, alert: &CompetitorAlert) {
        let origin: Vec<&str> = [alert.brand.as_str(), alert.source.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let name = if origin.is_empty() {
            format!("*{}*", alert.product_name)
        } else {
            format!("*{}* ({})", alert.product_name, origin.join(", "))
        };

        match alert.kind {
            CompetitorAlertKind::Rank => {
                let arrow = if alert.ranking_change > 0 { "▲" } else { "▼" };
                out.push_str(&format!("{arrow}{} {name}", alert.ranking_change.abs()));
                if let (Some(prev), Some(cur)) = (alert.prev_ranking, alert.current_ranking) {
                    out.push_str(&format!(": rank {prev} → {cur}"));
                }
                out.push('\n');
            }
            CompetitorAlertKind::Price => {
                let sign = if alert.price_change > 0.0 { "+" } else { "" };
                out.push_str(&format!(
                    "💲 {name}: price {sign}{}\n",
                    format_currency(alert.price_change, self.locale)
                ));
            }
        }
    }
}

/// Products ordered by rank (stable for ties), truncated to `top_n`.
fn leaderboard(mut products: Vec<ProductRecord>, top_n: usize) -> Vec<ProductRecord> {
    products.sort_by_key(|p| p.rank);
    products.truncate(top_n);
    products
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use wowpulse_core::{DeltaResult, PeriodKpiRecord, Severity, TrendDirection};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap()
    }

    fn deltas(values: &[(Metric, Option<f64>, Option<f64>)]) -> MetricDeltas {
        values
            .iter()
            .map(|&(metric, current, delta)| {
                let trend = match delta {
                    Some(d) if d < 0.0 => TrendDirection::Down,
                    Some(d) if d > 0.0 => TrendDirection::Up,
                    Some(_) => TrendDirection::Flat,
                    None => TrendDirection::Unknown,
                };
                (
                    metric,
                    DeltaResult {
                        metric,
                        current_value: current,
                        previous_value: None,
                        delta,
                        trend,
                    },
                )
            })
            .collect()
    }

    fn scenario_deltas() -> MetricDeltas {
        deltas(&[
            (Metric::Revenue, Some(100000.0), Some(-100.0 / 3.0)),
            (Metric::Orders, Some(50.0), Some(-50.0 / 3.0)),
            (Metric::AvgOrderValue, Some(2000.0), Some(-20.0)),
            (Metric::ConversionRate, Some(3.0), Some(-1.0)),
        ])
    }

    fn entity(id: &str, deltas: MetricDeltas) -> EntityComparison {
        EntityComparison {
            entity_id: id.into(),
            current: PeriodKpiRecord {
                entity_id: id.into(),
                ..Default::default()
            },
            previous: None,
            deltas,
        }
    }

    fn input() -> ReportInput {
        ReportInput {
            now: now(),
            aggregate: scenario_deltas(),
            entities: vec![entity("solo", scenario_deltas())],
            alerts: Vec::new(),
            products: Vec::new(),
            competitor_alerts: Vec::new(),
            diagnostics: ClassificationStats::default(),
        }
    }

    fn composer() -> ReportComposer {
        ReportComposer::new(&EngineConfig::single_entity("solo")).unwrap()
    }

    #[test]
    fn no_entities_is_no_data() {
        let mut input = input();
        input.entities.clear();
        input.alerts.push(Alert {
            severity: Severity::Critical,
            entity_id: "solo".into(),
            metric: Metric::Revenue,
            delta: -50.0,
            threshold: -20.0,
            message: "ignored".into(),
        });
        let report = composer().compose(input);

        assert!(!report.has_data);
        assert!(report.aggregate.is_empty());
        assert!(report.alerts.is_empty());
        assert!(report.top_products.is_empty());
        assert_eq!(
            report.rendered_text,
            "📊 *Daily KPI Report* | 2026-03-02\n\n⚠️ No data for the current period. Check the data source."
        );
    }

    #[test]
    fn zero_orders_is_no_data() {
        let mut input = input();
        input.aggregate = deltas(&[(Metric::Orders, Some(0.0), None)]);
        assert!(!composer().compose(input).has_data);
    }

    #[test]
    fn scenario_text() {
        let report = composer().compose(input());
        assert!(report.has_data);
        let expected = "\
📊 *Daily KPI Report* | 2026-03-02

*Key metrics*
━━━━━━━━━━━━━━━━━━━━━
💰 *Revenue*: ₩100,000 (-33.3% ↓)
📦 *Orders*: 50 (-16.7% ↓)
🛒 *Avg order value*: ₩2,000 (-20.0% ↓)
📈 *Conversion rate*: 3.0% (-1.0%p ↓)

📌 *solo*
• Revenue: ₩100,000 (-33.3% ↓)
• Orders: 50 (-16.7% ↓)

*🏆 Top 3 products*
No data

⏰ Generated at 00:30:00";
        assert_eq!(report.rendered_text, expected);
    }

    #[test]
    fn offset_moves_date_and_footer() {
        let mut config = EngineConfig::single_entity("solo");
        config.utc_offset_minutes = 9 * 60;
        let composer = ReportComposer::new(&config).unwrap();
        let mut input = input();
        input.now = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
        let report = composer.compose(input);
        assert_eq!(report.date_stamp.to_string(), "2026-03-02");
        assert!(report.rendered_text.ends_with("⏰ Generated at 08:00:00"));
    }

    #[test]
    fn leaderboard_sorted_by_rank_and_truncated() {
        let product = |name: &str, rank: u32| ProductRecord {
            product_name: name.into(),
            total_revenue: 1000.0,
            units_sold: 3,
            rank,
            ..Default::default()
        };
        let mut input = input();
        input.products = vec![
            product("d", 4),
            product("b", 2),
            product("a1", 1),
            product("c", 3),
            product("a2", 1),
        ];
        let report = composer().compose(input);
        let names: Vec<&str> = report
            .top_products
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["a1", "a2", "b"]);
        assert!(report.rendered_text.contains("1. *a1*: ₩1,000 (3 sold)\n2. *a2*"));
    }

    #[test]
    fn anomaly_and_competitor_blocks() {
        let mut config = EngineConfig::new(["minix"]);
        config
            .entity_labels
            .insert("minix".into(), EntityLabel::new("Minix", "🏠"));
        let composer = ReportComposer::new(&config).unwrap();

        let mut input = input();
        input.entities = vec![entity("minix", scenario_deltas())];
        input.alerts = vec![Alert {
            severity: Severity::Critical,
            entity_id: "minix".into(),
            metric: Metric::Revenue,
            delta: -100.0 / 3.0,
            threshold: -20.0,
            message: "Revenue down 33.3% vs last week".into(),
        }];
        input.competitor_alerts = vec![
            CompetitorAlert {
                kind: CompetitorAlertKind::Rank,
                product_name: "Rival kettle".into(),
                source: "coupang".into(),
                brand: "rival".into(),
                prev_ranking: Some(7),
                current_ranking: Some(4),
                ranking_change: 3,
                price_change: -1000.0,
            },
            CompetitorAlert {
                kind: CompetitorAlertKind::Price,
                product_name: "Rival kettle".into(),
                source: "coupang".into(),
                brand: "rival".into(),
                prev_ranking: Some(7),
                current_ranking: Some(4),
                ranking_change: 3,
                price_change: -1000.0,
            },
        ];
        let text = composer.compose(input).rendered_text;

        assert!(text.contains("🏠 *Minix*\n"));
        assert!(text.contains(
            "*🔔 Anomalies*\n🚨 *Critical* Minix: Revenue down 33.3% vs last week\n"
        ));
        assert!(text.contains(
            "*🔍 Competitor watch*\n▲3 *Rival kettle* (rival, coupang): rank 7 → 4\n💲 *Rival kettle* (rival, coupang): price -₩1,000\n"
        ));
    }

    #[test]
    fn no_anomaly_block_without_alerts() {
        let text = composer().compose(input()).rendered_text;
        assert!(!text.contains("Anomalies"));
        assert!(!text.contains("Competitor watch"));
    }

    #[test]
    fn entity_block_shows_roas_and_top_two_channels() {
        use wowpulse_core::ChannelShare;

        let mut input = input();
        input.entities[0].current.avg_roas = Some(3.2);
        input.entities[0].current.channel_breakdown = Some(vec![
            ChannelShare { channel: "own".into(), share_pct: 10.0 },
            ChannelShare { channel: "naver".into(), share_pct: 35.0 },
            ChannelShare { channel: "coupang".into(), share_pct: 55.0 },
        ]);
        let report = composer().compose(input);
        assert_eq!(report.per_entity[0].top_channels.len(), 2);
        assert!(report
            .rendered_text
            .contains("• ROAS: 3.20\n• Channels: coupang 55.0%, naver 35.0%\n"));
    }

    #[test]
    fn undefined_deltas_render_not_available() {
        let mut input = input();
        let undefined = deltas(&[
            (Metric::Revenue, Some(100000.0), None),
            (Metric::Orders, Some(50.0), None),
            (Metric::AvgOrderValue, Some(2000.0), None),
            (Metric::ConversionRate, Some(3.0), None),
        ]);
        input.aggregate = undefined.clone();
        input.entities = vec![entity("solo", undefined)];
        let text = composer().compose(input).rendered_text;
        assert!(text.contains("💰 *Revenue*: ₩100,000 (N/A)\n"));
        assert!(text.contains("📈 *Conversion rate*: 3.0% (N/A)\n"));
        assert!(!text.contains("0.0%"));
    }

    #[test]
    fn identical_input_renders_identically() {
        let a = composer().compose(input());
        let b = composer().compose(input());
        assert_eq!(a.rendered_text, b.rendered_text);
        assert_eq!(a, b);
    }
}
