//! In-memory backends standing in for Git and Vault.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prism_core::{ConfigMap, PropertySource};
use prism_git::{ConfigQuery, ConfigSnapshot, ConfigSource, ConfigSourceError};
use prism_transport::{ProxyAwareConnectionFactory, ProxySettings, TransportSession};

/// Serves fixed property sources and records every query it sees.
pub struct FixedBackend {
    name: String,
    sources: Vec<PropertySource>,
    fail: bool,
    factory: Arc<ProxyAwareConnectionFactory>,
    pub queries: Mutex<Vec<ConfigQuery>>,
}

impl FixedBackend {
    pub fn new(name: &str, sources: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources
                .iter()
                .map(|(n, json)| PropertySource::new(*n, ConfigMap::from_json(json).unwrap()))
                .collect(),
            fail: false,
            factory: Arc::new(ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, &[])
        }
    }
}

#[async_trait]
impl ConfigSource for FixedBackend {
    async fn fetch(
        &self,
        query: &ConfigQuery,
        _session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(ConfigSourceError::unavailable("connection refused"));
        }
        Ok(ConfigSnapshot::new(
            query.application(),
            query.profiles().to_vec(),
            query.effective_label("main"),
        )
        .with_version("0123abcd")
        .with_property_sources(self.sources.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
        self.factory.clone()
    }

    async fn health_check(&self) -> Result<(), ConfigSourceError> {
        if self.fail {
            return Err(ConfigSourceError::unavailable("connection refused"));
        }
        Ok(())
    }
}
