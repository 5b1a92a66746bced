//! Text formats a backend may hand back, and the flattened view the
//! composite works on.

use crate::config::ConfigMap;
use crate::error::Result;

pub mod properties;
pub mod spring;

pub use properties::PropertiesFormat;
pub use spring::{SpringEnvironment, SpringPropertySource, flatten_config_map};

/// Parses configuration text into a [`ConfigMap`].
pub trait FormatParser: Send + Sync {
    fn parse(&self, input: &str) -> Result<ConfigMap>;
}

pub struct JsonFormat;

impl FormatParser for JsonFormat {
    fn parse(&self, input: &str) -> Result<ConfigMap> {
        ConfigMap::from_json(input)
    }
}

pub struct YamlFormat;

impl FormatParser for YamlFormat {
    fn parse(&self, input: &str) -> Result<ConfigMap> {
        ConfigMap::from_yaml(input)
    }
}
