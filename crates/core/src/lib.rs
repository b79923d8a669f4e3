pub mod alert;
pub mod batch;
pub mod config;
pub mod delta;
pub mod entity;
pub mod error;
pub mod locale;
pub mod metric;
pub mod record;

pub use alert::*;
pub use batch::ClassificationStats;
pub use config::{load_dotenv, Config, EngineConfig, NotifyConfig};
pub use delta::*;
pub use entity::*;
pub use error::*;
pub use locale::{CurrencyLocale, GlyphPosition};
pub use metric::*;
pub use record::*;
