//! The composite resolver: every backend in declared order, first key wins.

use std::sync::Arc;

use prism_core::FirstWinsMerge;
use prism_git::{ConfigQuery, ConfigSnapshot};
use prism_transport::ConnectionFactoryProvider;
use tracing::{debug, error, info, instrument};

use crate::error::CompositeError;
use crate::factory::BackendHandle;

/// Resolves queries against an ordered list of backends.
///
/// A resolution holds the provider's transport session from the first
/// backend to the last, so concurrent resolutions never interleave factory
/// installs and never see a clone refreshed halfway through their snapshot.
pub struct CompositeResolver {
    handles: Vec<BackendHandle>,
    provider: Arc<ConnectionFactoryProvider>,
}

impl CompositeResolver {
    pub fn new(handles: Vec<BackendHandle>, provider: Arc<ConnectionFactoryProvider>) -> Self {
        Self { handles, provider }
    }

    /// Resolves `application` for a comma-separated profile list.
    pub async fn resolve(
        &self,
        application: &str,
        profiles: &str,
        label: Option<&str>,
    ) -> Result<ConfigSnapshot, CompositeError> {
        self.resolve_query(&ConfigQuery::from_path(application, profiles, label))
            .await
    }

    /// Queries every backend in order and merges the results.
    ///
    /// Fails as a whole when any backend fails; no partial snapshot is
    /// returned.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn resolve_query(&self, query: &ConfigQuery) -> Result<ConfigSnapshot, CompositeError> {
        let mut session = self.provider.session().await;
        let mut merge = FirstWinsMerge::new();
        let mut version = None;

        for handle in &self.handles {
            session.install(handle.connection_factory());
            let result = handle.fetch(query, &session).await;
            session.drain().await;

            let snapshot = result.map_err(|e| {
                error!(backend = %handle.name(), error = %e, "Composite resolution failed");
                CompositeError::resolution(handle.name(), e)
            })?;

            if version.is_none() {
                version = snapshot.version().map(str::to_string);
            }
            let offered = snapshot.len();
            let kept = snapshot
                .into_property_sources()
                .into_iter()
                .map(|source| source.with_origin(handle.name()))
                .filter(|source| merge.offer(source))
                .count();
            debug!(backend = %handle.name(), offered, kept, "Merged backend result");
        }
        drop(session);

        let label = query
            .label()
            .or_else(|| self.handles.first().map(|h| h.default_label()))
            .unwrap_or("main");
        let snapshot = ConfigSnapshot::new(query.application(), query.profiles().to_vec(), label)
            .with_optional_version(version)
            .with_property_sources(merge.into_sources());

        info!(sources = snapshot.len(), "Resolved composite snapshot");
        Ok(snapshot)
    }

    /// Names of the configured backends in precedence order.
    pub fn health(&self) -> Vec<&str> {
        self.handles.iter().map(|h| h.name()).collect()
    }

    /// Runs every backend's local health check.
    pub async fn check_health(&self) -> Vec<(String, Result<(), String>)> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in &self.handles {
            let status = handle.health_check().await.map_err(|e| e.to_string());
            results.push((handle.name().to_string(), status));
        }
        results
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for CompositeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeResolver")
            .field("backends", &self.health())
            .finish()
    }
}
