use thiserror::Error;

use crate::metric::Metric;

/// Configuration problems detected before any report is produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },

    #[error("entity list is empty")]
    EmptyEntityList,

    #[error("entity list contains a blank id")]
    BlankEntity,

    #[error("entity '{0}' is listed more than once")]
    DuplicateEntity(String),

    #[error("top_n must be at least 1")]
    InvalidTopN,

    #[error("competitor_alert_limit must be at least 1")]
    InvalidCompetitorLimit,

    #[error("unsupported currency locale: '{0}'")]
    UnsupportedLocale(String),

    #[error("utc offset of {0} minutes is out of range")]
    InvalidUtcOffset(i32),

    #[error("threshold override for unknown entity '{0}'")]
    UnknownOverrideEntity(String),

    #[error("threshold override {entity}/{metric} must be a finite negative number, got {value}")]
    InvalidThreshold {
        entity: String,
        metric: Metric,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
