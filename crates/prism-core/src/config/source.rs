use crate::config::map::ConfigMap;
use serde::{Deserialize, Serialize};

/// A named group of configuration properties.
///
/// One property source corresponds to one file of a git repository or one
/// secret path of a secret store. `origin` records which backend produced it
/// so a merged snapshot can still be traced back to its handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySource {
    /// The name of the group (e.g. `https://git/config.git/app.yml`, `vault:app`).
    pub name: String,

    /// The backend that produced this group (e.g. `git[0]`).
    #[serde(default)]
    pub origin: String,

    pub config: ConfigMap,
}

impl PropertySource {
    pub fn new(name: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            name: name.into(),
            origin: String::new(),
            config,
        }
    }

    /// Builder-style method to record the producing backend.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}
