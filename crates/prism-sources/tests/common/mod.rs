#![allow(dead_code)]
//! Shared fixtures for composite and Vault tests.

pub mod http;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use prism_core::{ConfigMap, PropertySource};
use prism_git::{ConfigQuery, ConfigSnapshot, ConfigSource, ConfigSourceError};
use prism_sources::BackendHandle;
use prism_transport::{ProxyAwareConnectionFactory, ProxySettings, TransportSession};

pub fn direct_factory() -> Arc<ProxyAwareConnectionFactory> {
    Arc::new(ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap())
}

pub fn source(name: &str, json: &str) -> PropertySource {
    PropertySource::new(name, ConfigMap::from_json(json).unwrap())
}

/// A backend answering every query with the same property sources.
///
/// When `probe_url` is set, each fetch also opens a connection to it through
/// the session, so tests can observe what the composite drains.
pub struct StaticSource {
    pub name: String,
    pub sources: Vec<PropertySource>,
    pub version: Option<String>,
    pub factory: Arc<ProxyAwareConnectionFactory>,
    pub probe_url: Option<String>,
    pub delay: Duration,
    pub fetches: AtomicUsize,
    /// Fetches that found a different factory installed than their own.
    pub foreign_factory_seen: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &str, sources: Vec<PropertySource>) -> Self {
        Self {
            name: name.to_string(),
            sources,
            version: None,
            factory: direct_factory(),
            probe_url: None,
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            foreign_factory_seen: AtomicUsize::new(0),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_probe(mut self, url: String) -> Self {
        self.probe_url = Some(url);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for StaticSource {
    async fn fetch(
        &self,
        query: &ConfigQuery,
        session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !session.active().is_some_and(|f| Arc::ptr_eq(f, &self.factory)) {
            self.foreign_factory_seen.fetch_add(1, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(url) = &self.probe_url {
            let connection = session.open(url).await?;
            connection.lock().await.status_code().await?;
        }
        if !session.active().is_some_and(|f| Arc::ptr_eq(f, &self.factory)) {
            self.foreign_factory_seen.fetch_add(1, Ordering::SeqCst);
        }

        Ok(
            ConfigSnapshot::new(query.application(), query.profiles().to_vec(), "main")
                .with_optional_version(self.version.clone())
                .with_property_sources(self.sources.clone()),
        )
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
        self.factory.clone()
    }
}

/// A backend whose every fetch fails.
pub struct FailingSource {
    pub name: String,
    pub factory: Arc<ProxyAwareConnectionFactory>,
}

impl FailingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factory: direct_factory(),
        }
    }
}

#[async_trait]
impl ConfigSource for FailingSource {
    async fn fetch(
        &self,
        _query: &ConfigQuery,
        _session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        Err(ConfigSourceError::unavailable("remote is down"))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
        self.factory.clone()
    }

    async fn health_check(&self) -> Result<(), ConfigSourceError> {
        Err(ConfigSourceError::unavailable("remote is down"))
    }
}

pub fn handles(sources: Vec<Arc<StaticSource>>) -> Vec<BackendHandle> {
    sources.into_iter().map(|s| s as BackendHandle).collect()
}
