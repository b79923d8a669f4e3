pub mod classifier;
pub mod comparator;
pub mod error;
pub mod pipeline;

pub use classifier::{classify, classify_tagged_json, classify_untagged, Partitions};
pub use error::EngineError;
pub use pipeline::Engine;
