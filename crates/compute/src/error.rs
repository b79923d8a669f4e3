use thiserror::Error;

use wowpulse_core::ConfigError;
use wowpulse_rules::RuleError;

/// Reasons an [`Engine`](crate::Engine) refuses to start.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid rule set: {0}")]
    Rules(#[from] RuleError),
}
