use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// KPI metrics compared period over period.
///
/// Declaration order is the order used by the aggregate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    Orders,
    AvgOrderValue,
    ConversionRate,
}

/// How two values of a metric are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    /// Relative change in percent of the previous value.
    Percent,
    /// Plain difference, for values that are already rates.
    Points,
}

impl DeltaKind {
    pub fn unit(self) -> &'static str {
        match self {
            DeltaKind::Percent => "%",
            DeltaKind::Points => "%p",
        }
    }
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Revenue,
        Metric::Orders,
        Metric::AvgOrderValue,
        Metric::ConversionRate,
    ];

    pub fn delta_kind(self) -> DeltaKind {
        match self {
            Metric::ConversionRate => DeltaKind::Points,
            _ => DeltaKind::Percent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Orders => "orders",
            Metric::AvgOrderValue => "avg_order_value",
            Metric::ConversionRate => "conversion_rate",
        }
    }

    /// Human-readable name used in reports and alert messages.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::Orders => "Orders",
            Metric::AvgOrderValue => "Avg order value",
            Metric::ConversionRate => "Conversion rate",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.as_str()).collect()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(Metric::Revenue),
            "orders" => Ok(Metric::Orders),
            "avg_order_value" => Ok(Metric::AvgOrderValue),
            "conversion_rate" => Ok(Metric::ConversionRate),
            other => Err(format!("unknown metric: '{}'", other)),
        }
    }
}
