use std::io::Cursor;

use java_properties::PropertiesIter;

use crate::config::{ConfigMap, ConfigValue};
use crate::error::{PrismError, Result};
use crate::format::FormatParser;

/// Java `.properties` parser.
///
/// Keys are kept flat (`server.port` stays one key) and every value is a
/// string, matching how property files are consumed by Spring clients.
/// Escapes, continuation lines and `:`/`=`/whitespace separators are handled
/// by the `java-properties` crate.
pub struct PropertiesFormat;

impl FormatParser for PropertiesFormat {
    fn parse(&self, input: &str) -> Result<ConfigMap> {
        let mut map = ConfigMap::new();
        PropertiesIter::new(Cursor::new(input.as_bytes()))
            .read_into(|key, value| map.insert(key, ConfigValue::String(value)))
            .map_err(|e| PrismError::parse_error("properties", e.to_string()))?;
        Ok(map)
    }
}
