use crate::config::{ConfigMap, ConfigValue, PropertySource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Spring Cloud Config compatible environment document.
///
/// This is the wire shape clients of the gateway expect; the server builds it
/// from a resolved snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringEnvironment {
    pub name: String,
    pub profiles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    pub property_sources: Vec<SpringPropertySource>,
}

/// Property source in Spring format (flattened keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpringPropertySource {
    pub name: String,
    pub source: IndexMap<String, ConfigValue>,
}

impl SpringEnvironment {
    pub fn new(name: impl Into<String>, profiles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            profiles,
            label: None,
            version: None,
            state: None,
            property_sources: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn add_source(mut self, source: SpringPropertySource) -> Self {
        self.property_sources.push(source);
        self
    }
}

impl From<&PropertySource> for SpringPropertySource {
    fn from(ps: &PropertySource) -> Self {
        SpringPropertySource {
            name: ps.name.clone(),
            source: flatten_config_map(&ps.config),
        }
    }
}

/// Flattens a hierarchical ConfigMap into dot-notation keys.
///
/// `{"server": {"port": 80}}` becomes `{"server.port": 80}` and sequences
/// become indexed keys, `{"hosts": ["a", "b"]}` yields `hosts[0]` and
/// `hosts[1]`. Empty objects and sequences stay leaves. Keys that already
/// contain dots are kept as they are, so flat and nested sources describe the
/// same property with the same key.
pub fn flatten_config_map(config: &ConfigMap) -> IndexMap<String, ConfigValue> {
    let mut flat_map = IndexMap::new();
    for (key, value) in config.as_inner() {
        flatten_value(key, value, &mut flat_map);
    }
    flat_map
}

fn flatten_value(prefix: &str, value: &ConfigValue, target: &mut IndexMap<String, ConfigValue>) {
    match value {
        ConfigValue::Object(map) if !map.is_empty() => {
            for (key, inner) in map {
                flatten_value(&format!("{}.{}", prefix, key), inner, target);
            }
        },
        ConfigValue::Array(items) if !items.is_empty() => {
            for (index, inner) in items.iter().enumerate() {
                flatten_value(&format!("{}[{}]", prefix, index), inner, target);
            }
        },
        _ => {
            target.insert(prefix.to_string(), value.clone());
        },
    }
}
