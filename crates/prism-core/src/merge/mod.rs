//! First-wins merging of property sources.
//!
//! The composite walks its backends in declared order and feeds every
//! property source through one [`FirstWinsMerge`]. A key is owned by the
//! first source that mentions it; later occurrences are dropped. Sources that
//! end up empty are discarded, so a key appears in at most one group of the
//! final snapshot.

use std::collections::HashSet;

use crate::config::{ConfigMap, PropertySource};
use crate::format::flatten_config_map;

/// Accumulates the set of keys already claimed by earlier sources.
#[derive(Debug, Default)]
pub struct FirstWinsMerge {
    seen: HashSet<String>,
    sources: Vec<PropertySource>,
}

impl FirstWinsMerge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one source to the merge.
    ///
    /// Keys are compared in flattened dot notation. The unclaimed part of the
    /// source is appended under its original name and origin; returns `true`
    /// when anything survived.
    pub fn offer(&mut self, source: &PropertySource) -> bool {
        let filtered: ConfigMap = flatten_config_map(&source.config)
            .into_iter()
            .filter(|(key, _)| self.seen.insert(key.clone()))
            .collect();

        if filtered.is_empty() {
            return false;
        }

        self.sources.push(PropertySource {
            name: source.name.clone(),
            origin: source.origin.clone(),
            config: filtered,
        });
        true
    }

    /// Returns true if `key` has already been claimed.
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn sources(&self) -> &[PropertySource] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<PropertySource> {
        self.sources
    }
}
