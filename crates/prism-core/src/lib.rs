//! Prism Core - Domain types for the composite configuration gateway.
//!
//! This crate holds the values every backend produces and the composite
//! consumes: [`ConfigValue`] trees, named [`PropertySource`] groups, the
//! format parsers used to read them, and the first-wins merge rule that
//! turns many groups into one deduplicated snapshot.

pub mod config;
pub mod error;
pub mod format;
pub mod merge;

pub use config::{ConfigMap, ConfigValue, PropertySource};
pub use error::{PrismError, Result};
pub use merge::FirstWinsMerge;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
