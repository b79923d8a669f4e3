//! Input records supplied by the upstream data sources.
//!
//! Every [`Record`] carries an explicit `kind` discriminant and KPI records
//! carry an explicit [`Period`], so the engine never has to guess a record's
//! role from its shape or position in the batch.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::metric::Metric;

/// Which side of the week-over-week comparison a KPI record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Current,
    Comparison,
}

/// Share of revenue attributed to one sales channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub share_pct: f64,
}

/// Aggregated KPIs of one entity over one period.
///
/// Numeric fields are optional: a null or missing value means "no value",
/// which the comparator treats the same as a zero baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodKpiRecord {
    #[serde(alias = "brand")]
    pub entity_id: EntityId,
    #[serde(default, alias = "revenue")]
    pub total_revenue: Option<f64>,
    #[serde(default)]
    pub total_orders: Option<f64>,
    #[serde(default)]
    pub avg_order_value: Option<f64>,
    #[serde(default)]
    pub conversion_rate: Option<f64>,
    #[serde(default)]
    pub avg_roas: Option<f64>,
    #[serde(default)]
    pub channel_breakdown: Option<Vec<ChannelShare>>,
}

impl PeriodKpiRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Revenue => self.total_revenue,
            Metric::Orders => self.total_orders,
            Metric::AvgOrderValue => self.avg_order_value,
            Metric::ConversionRate => self.conversion_rate,
        }
    }

    /// True when the record carries a positive order count.
    pub fn has_volume(&self) -> bool {
        matches!(self.total_orders, Some(v) if v > 0.0)
    }

    /// The `limit` largest channels by share. Ties keep input order.
    pub fn top_channels(&self, limit: usize) -> Vec<&ChannelShare> {
        let mut channels: Vec<&ChannelShare> = match &self.channel_breakdown {
            Some(breakdown) => breakdown.iter().collect(),
            None => return Vec::new(),
        };
        channels.sort_by(|a, b| b.share_pct.total_cmp(&a.share_pct));
        channels.truncate(limit);
        channels
    }
}

/// A KPI record tagged with its period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodKpi {
    pub period: Period,
    #[serde(flatten)]
    pub record: PeriodKpiRecord,
}

/// A top-selling product row.
///
/// Spreadsheet exports often write counts as `12.0` and blanks as null; both
/// are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub units_sold: u64,
    #[serde(deserialize_with = "lenient::rank")]
    pub rank: u32,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "brand")]
    pub entity_id: Option<EntityId>,
}

/// Ranking and price movement of a tracked competitor product.
///
/// `brand` is the competitor's brand and is not checked against the
/// configured entity list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRecord {
    #[serde(deserialize_with = "lenient::string")]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
    #[serde(default, alias = "entity_id", deserialize_with = "lenient::string")]
    pub brand: String,
    #[serde(default)]
    pub prev_ranking: Option<i64>,
    #[serde(default)]
    pub current_ranking: Option<i64>,
    #[serde(default)]
    pub ranking_change: Option<i64>,
    /// Null means no price movement.
    #[serde(default, deserialize_with = "lenient::number")]
    pub price_change: f64,
}

impl CompetitorRecord {
    /// Places climbed (positive) or lost (negative).
    ///
    /// Falls back to `prev_ranking - current_ranking` when the source did not
    /// supply the change itself.
    pub fn rank_change(&self) -> i64 {
        self.ranking_change
            .or_else(|| match (self.prev_ranking, self.current_ranking) {
                (Some(prev), Some(cur)) => Some(prev - cur),
                _ => None,
            })
            .unwrap_or(0)
    }
}

/// One input record. The `kind` field is the discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    PeriodKpi(PeriodKpi),
    Product(ProductRecord),
    Competitor(CompetitorRecord),
}

impl Record {
    pub fn current(record: PeriodKpiRecord) -> Self {
        Record::PeriodKpi(PeriodKpi {
            period: Period::Current,
            record,
        })
    }

    pub fn comparison(record: PeriodKpiRecord) -> Self {
        Record::PeriodKpi(PeriodKpi {
            period: Period::Comparison,
            record,
        })
    }
}

/// Null-tolerant field decoders for product and competitor rows.
mod lenient {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(v) => whole::<D::Error>(v),
            None => Ok(0),
        }
    }

    pub fn rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let v = f64::deserialize(deserializer)?;
        let n = whole::<D::Error>(v)?;
        u32::try_from(n).map_err(|_| D::Error::custom(format!("rank {v} is out of range")))
    }

    /// `12` and `12.0` are the same count; `12.5` and `-1` are errors.
    fn whole<E: Error>(v: f64) -> Result<u64, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(v as u64)
        } else {
            Err(E::custom(format!("expected a whole non-negative number, got {v}")))
        }
    }
}
