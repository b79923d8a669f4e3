use serde::{Deserialize, Serialize};

/// Per-batch classification counters.
///
/// Every input record lands in exactly one counter, so `total` always equals
/// the sum of the others. Anything outside the four accepted buckets is data
/// that was rejected and must be visible to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total: usize,
    pub current: usize,
    pub comparison: usize,
    pub products: usize,
    pub competitors: usize,
    /// Records matching no known shape, or failing to deserialize.
    pub unclassified: usize,
    /// Records naming an entity outside the configured list.
    pub unknown_entity: usize,
    /// Extra KPI records for an (entity, period) pair already seen.
    pub duplicates: usize,
}

impl ClassificationStats {
    pub fn accepted(&self) -> usize {
        self.current + self.comparison + self.products + self.competitors
    }

    pub fn rejected(&self) -> usize {
        self.unclassified + self.unknown_entity + self.duplicates
    }
}
