//! Record classification.
//!
//! Splits one ordered batch into current and comparison KPI records keyed by
//! entity, product rows and competitor rows. Every input record is either
//! placed in exactly one partition or counted as rejected in
//! [`ClassificationStats`].

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use wowpulse_core::{
    ClassificationStats, CompetitorRecord, EngineConfig, EntityId, Period, PeriodKpiRecord,
    ProductRecord, Record,
};

/// Classified batch.
#[derive(Debug, Clone, Default)]
pub struct Partitions {
    /// Current-period records in encounter order.
    pub current: IndexMap<EntityId, PeriodKpiRecord>,
    pub comparison: IndexMap<EntityId, PeriodKpiRecord>,
    pub products: Vec<ProductRecord>,
    pub competitors: Vec<CompetitorRecord>,
    pub stats: ClassificationStats,
}

/// Classify a batch of tagged records.
pub fn classify(records: &[Record], config: &EngineConfig) -> Partitions {
    let mut sorter = Sorter::new(config);
    for (index, record) in records.iter().enumerate() {
        sorter.parts.stats.total += 1;
        sorter.push_record(index, record.clone());
    }
    sorter.finish()
}

/// Classify tagged records still in JSON form.
///
/// A value that does not decode as a [`Record`] is counted as unclassified
/// and the rest of the batch is kept.
pub fn classify_tagged_json(values: &[Value], config: &EngineConfig) -> Partitions {
    let mut sorter = Sorter::new(config);
    for (index, value) in values.iter().enumerate() {
        sorter.parts.stats.total += 1;
        match serde_json::from_value::<Record>(value.clone()) {
            Ok(record) => sorter.push_record(index, record),
            Err(e) => sorter.reject_unclassified(index, &format!("undecodable tagged record: {e}")),
        }
    }
    sorter.finish()
}

/// Classify a batch of untagged JSON objects by their shape.
///
/// First match wins:
/// 1. a `rank` field makes a product row;
/// 2. `current_ranking` or `ranking_change` makes a competitor row;
/// 3. an entity id (`entity_id` or `brand`, implied when exactly one entity
///    is configured) together with `total_revenue` or `revenue` makes a KPI
///    record.
///
/// Null fields count as missing. KPI records carry no period, so the first
/// N of them (N = configured entity count) are taken as current and the rest
/// as comparison. Anything that matches no shape, or matches one but fails to
/// deserialize, is counted as unclassified.
pub fn classify_untagged(values: &[Value], config: &EngineConfig) -> Partitions {
    let mut sorter = Sorter::new(config);
    let implied_entity = match config.entity_list.as_slice() {
        [only] => Some(only),
        _ => None,
    };
    let mut kpi_position = 0usize;

    for (index, value) in values.iter().enumerate() {
        sorter.parts.stats.total += 1;
        let Some(obj) = value.as_object() else {
            sorter.reject_unclassified(index, "not a JSON object");
            continue;
        };

        match detect_shape(obj, implied_entity.is_some()) {
            Some(Shape::Product) => match serde_json::from_value::<ProductRecord>(value.clone()) {
                Ok(product) => sorter.push_product(index, product),
                Err(e) => sorter.reject_unclassified(index, &format!("bad product row: {e}")),
            },
            Some(Shape::Competitor) => {
                match serde_json::from_value::<CompetitorRecord>(value.clone()) {
                    Ok(competitor) => sorter.push_competitor(competitor),
                    Err(e) => sorter.reject_unclassified(index, &format!("bad competitor row: {e}")),
                }
            }
            Some(Shape::Kpi) => {
                let period = if kpi_position < config.entity_list.len() {
                    Period::Current
                } else {
                    Period::Comparison
                };
                kpi_position += 1;

                let mut obj = obj.clone();
                if let Some(id) = implied_entity {
                    if !has_field(&obj, "entity_id") && !has_field(&obj, "brand") {
                        obj.insert("entity_id".to_string(), Value::String(id.to_string()));
                    }
                }
                match serde_json::from_value::<PeriodKpiRecord>(Value::Object(obj)) {
                    Ok(record) => sorter.push_kpi(index, period, record),
                    Err(e) => sorter.reject_unclassified(index, &format!("bad KPI record: {e}")),
                }
            }
            None => sorter.reject_unclassified(index, "matches no known record shape"),
        }
    }
    sorter.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Product,
    Competitor,
    Kpi,
}

fn detect_shape(obj: &Map<String, Value>, entity_implied: bool) -> Option<Shape> {
    if has_field(obj, "rank") {
        return Some(Shape::Product);
    }
    if has_field(obj, "current_ranking") || has_field(obj, "ranking_change") {
        return Some(Shape::Competitor);
    }
    let has_entity = entity_implied || has_field(obj, "entity_id") || has_field(obj, "brand");
    let has_revenue = has_field(obj, "total_revenue") || has_field(obj, "revenue");
    (has_entity && has_revenue).then_some(Shape::Kpi)
}

fn has_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(|v| !v.is_null())
}

/// Accumulates partitions and counters for one batch.
struct Sorter<'a> {
    config: &'a EngineConfig,
    parts: Partitions,
}

impl<'a> Sorter<'a> {
    fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            parts: Partitions::default(),
        }
    }

    fn push_record(&mut self, index: usize, record: Record) {
        match record {
            Record::PeriodKpi(kpi) => self.push_kpi(index, kpi.period, kpi.record),
            Record::Product(product) => self.push_product(index, product),
            Record::Competitor(competitor) => self.push_competitor(competitor),
        }
    }

    fn push_kpi(&mut self, index: usize, period: Period, record: PeriodKpiRecord) {
        let entity = record.entity_id.clone();
        if !self.config.contains(entity.as_str()) {
            self.parts.stats.unknown_entity += 1;
            warn!(index, entity = %entity, ?period, "KPI record names an unconfigured entity, dropped");
            return;
        }

        let (bucket, counter) = match period {
            Period::Current => (&mut self.parts.current, &mut self.parts.stats.current),
            Period::Comparison => (&mut self.parts.comparison, &mut self.parts.stats.comparison),
        };
        if bucket.contains_key(&entity) {
            self.parts.stats.duplicates += 1;
            warn!(index, entity = %entity, ?period, "duplicate KPI record, keeping the first");
            return;
        }
        bucket.insert(entity, record);
        *counter += 1;
    }

    fn push_product(&mut self, index: usize, product: ProductRecord) {
        if let Some(entity) = &product.entity_id {
            if !self.config.contains(entity.as_str()) {
                self.parts.stats.unknown_entity += 1;
                warn!(index, entity = %entity, product = %product.product_name, "product row names an unconfigured entity, dropped");
                return;
            }
        }
        self.parts.products.push(product);
        self.parts.stats.products += 1;
    }

    fn push_competitor(&mut self, competitor: CompetitorRecord) {
        self.parts.competitors.push(competitor);
        self.parts.stats.competitors += 1;
    }

    fn reject_unclassified(&mut self, index: usize, reason: &str) {
        self.parts.stats.unclassified += 1;
        warn!(index, reason, "unclassified record, dropped");
    }

    fn finish(self) -> Partitions {
        let stats = &self.parts.stats;
        debug!(
            total = stats.total,
            current = stats.current,
            comparison = stats.comparison,
            products = stats.products,
            competitors = stats.competitors,
            rejected = stats.rejected(),
            "classified batch"
        );
        self.parts
    }
}
