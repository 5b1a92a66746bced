//! Configuration snapshot types.

use serde::{Deserialize, Serialize};
use prism_core::PropertySource;

/// Configuration resolved for one query.
///
/// Backends return a snapshot of their own property sources; the composite
/// returns one merged snapshot per request. A snapshot is never modified
/// after it is handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// The application name.
    name: String,

    /// The active profiles.
    profiles: Vec<String>,

    /// The resolved label (branch/tag/commit).
    label: String,

    /// The version (e.g., commit hash).
    version: Option<String>,

    /// Additional state information.
    state: Option<String>,

    /// The property sources in order of precedence (first = highest).
    property_sources: Vec<PropertySource>,
}

impl ConfigSnapshot {
    /// Creates a new, empty snapshot.
    pub fn new(name: impl Into<String>, profiles: Vec<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profiles,
            label: label.into(),
            version: None,
            state: None,
            property_sources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the version (commit hash) if available.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn property_sources(&self) -> &[PropertySource] {
        &self.property_sources
    }

    /// Consumes the snapshot, returning its property sources.
    pub fn into_property_sources(self) -> Vec<PropertySource> {
        self.property_sources
    }

    /// Adds a property source.
    ///
    /// Sources added first have higher precedence.
    pub fn add_property_source(&mut self, source: PropertySource) {
        self.property_sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.property_sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.property_sources.len()
    }

    /// Builder-style method to set version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builder-style method to set version when one is known.
    pub fn with_optional_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Builder-style method to set state.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Builder-style method to replace the property sources.
    pub fn with_property_sources(mut self, sources: Vec<PropertySource>) -> Self {
        self.property_sources = sources;
        self
    }
}
