//! Configuration file parsing.

use prism_core::ConfigMap;
use prism_core::format::{FormatParser, JsonFormat, PropertiesFormat, YamlFormat};

use super::ConfigFormat;
use crate::error::ConfigSourceError;

/// Parser for configuration files.
pub struct ConfigParser;

impl ConfigParser {
    /// Parses configuration content based on the specified format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<ConfigMap, ConfigSourceError> {
        let parser: &dyn FormatParser = match format {
            ConfigFormat::Yaml => &YamlFormat,
            ConfigFormat::Json => &JsonFormat,
            ConfigFormat::Properties => &PropertiesFormat,
        };
        parser
            .parse(content)
            .map_err(|e| ConfigSourceError::parse("", e.to_string()))
    }
}
