use crate::config::value::ConfigValue;
use crate::error::{PrismError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered map of configuration keys to values.
///
/// Backed by an `IndexMap` so iteration follows insertion order; the composite
/// merge relies on that to produce the same snapshot for the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigMap {
    #[serde(flatten)]
    inner: IndexMap<String, ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    pub fn from_inner(inner: IndexMap<String, ConfigValue>) -> Self {
        Self { inner }
    }

    pub fn as_inner(&self) -> &IndexMap<String, ConfigValue> {
        &self.inner
    }

    pub fn as_inner_mut(&mut self) -> &mut IndexMap<String, ConfigValue> {
        &mut self.inner
    }

    pub fn into_inner(self) -> IndexMap<String, ConfigValue> {
        self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Looks a value up by key.
    ///
    /// An exact key match wins (flat sources such as secret payloads store
    /// dotted keys verbatim); otherwise the path is walked through nested
    /// objects segment by segment.
    ///
    /// ```
    /// # use prism_core::ConfigMap;
    /// let map = ConfigMap::from_json(r#"{"server": {"port": 8080}, "a.b": 1}"#).unwrap();
    /// assert_eq!(map.get("server.port").and_then(|v| v.as_i64()), Some(8080));
    /// assert_eq!(map.get("a.b").and_then(|v| v.as_i64()), Some(1));
    /// ```
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return None;
        }

        if let Some(value) = self.inner.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let mut current = self.inner.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PrismError::parse_error_with_cause("json", e.to_string(), e))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PrismError::parse_error("json", e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty YAML document deserializes to unit, not a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| PrismError::parse_error_with_cause("yaml", e.to_string(), e))
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigMap {
    fn from(map: IndexMap<String, ConfigValue>) -> Self {
        ConfigMap { inner: map }
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        ConfigMap {
            inner: iter.into_iter().collect(),
        }
    }
}
