#![allow(dead_code)]
use prism_core::{ConfigMap, PropertySource};

/// Builds a ConfigMap from JSON. Panics on invalid input (tests only).
pub fn config_from_json(json: &str) -> ConfigMap {
    ConfigMap::from_json(json).expect("Failed to create test config from JSON")
}

/// Builds a PropertySource tagged with the backend that produced it.
pub fn source(name: &str, origin: &str, json_content: &str) -> PropertySource {
    PropertySource::new(name, config_from_json(json_content)).with_origin(origin)
}
