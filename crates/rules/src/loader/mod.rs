//! Rule set loading from files, strings, or the built-in default.
//!
//! Every loaded document is validated before it is returned; warnings are
//! logged and errors abort the load.

mod core;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::{default_rule_set, load_file, load_str, DEFAULT_RULES_YAML};
pub use self::error::{Result, RuleError};
