//! Git backend handle.

use std::sync::Arc;

use async_trait::async_trait;
use prism_transport::{ProxyAwareConnectionFactory, TransportError, TransportSession};
use tracing::{debug, info, instrument, warn};

use crate::error::ConfigSourceError;
use crate::pattern::RepoPatterns;
use crate::reader::ConfigFileResolver;
use crate::repository::{GitRef, GitRepoSettings, GitRepository, RepoState, probe_remote_refs};
use crate::source::{ConfigQuery, ConfigSnapshot, ConfigSource};

/// One repository together with the resolver reading its revisions.
struct RepoHandle {
    repository: GitRepository,
    resolver: ConfigFileResolver,
}

impl RepoHandle {
    fn new(settings: GitRepoSettings) -> Self {
        let resolver = ConfigFileResolver::new(settings.search_paths().to_vec(), settings.uri());
        Self {
            repository: GitRepository::new(settings),
            resolver,
        }
    }

    fn settings(&self) -> &GitRepoSettings {
        self.repository.settings()
    }

    async fn fetch(
        &self,
        query: &ConfigQuery,
        session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        let factory = session.active().cloned().ok_or(TransportError::NoActiveFactory)?;
        let label = query.effective_label(self.settings().default_label()).to_string();
        let git_ref = GitRef::parse(&label);

        self.synchronize(&git_ref, session, factory).await?;

        let resolver = self.resolver.clone();
        let (commit, sources) = {
            let query = query.clone();
            let label = label.clone();
            self.repository
                .read_revision(&git_ref, move |tree| resolver.resolve(tree, &query, &label))
                .await?
        };

        Ok(ConfigSnapshot::new(query.application(), query.profiles().to_vec(), label)
            .with_version(commit)
            .with_property_sources(sources))
    }

    /// Brings the local clone up to date with what the remote advertises.
    ///
    /// Only a missing clone is fatal; a failed refresh serves the clone
    /// already on disk.
    async fn synchronize(
        &self,
        git_ref: &GitRef,
        session: &TransportSession<'_>,
        factory: Arc<ProxyAwareConnectionFactory>,
    ) -> Result<(), ConfigSourceError> {
        let settings = self.settings();

        if !self.repository.exists_locally() {
            return self.repository.ensure_cloned(factory).await;
        }
        if settings.force_pull() {
            debug!(uri = %settings.uri(), "Force pull");
            self.refresh_or_serve(factory).await;
            return Ok(());
        }
        if !settings.is_http_remote() {
            return Ok(());
        }

        match probe_remote_refs(session, settings).await {
            Ok(refs) => {
                let Some(remote) = refs.commit_for(git_ref) else {
                    return Ok(());
                };
                let local = self.repository.resolve(git_ref).await.ok();
                if local.as_deref() != Some(remote) {
                    info!(uri = %settings.uri(), label = %git_ref, remote, "Remote moved, refreshing clone");
                    self.refresh_or_serve(factory).await;
                }
            },
            Err(e) => {
                warn!(uri = %settings.uri(), error = %e, "Remote probe failed, serving local clone");
            },
        }
        Ok(())
    }

    async fn refresh_or_serve(&self, factory: Arc<ProxyAwareConnectionFactory>) {
        if let Err(e) = self.repository.refresh(factory).await {
            warn!(uri = %self.settings().uri(), error = %e, "Refresh failed, serving local clone");
        }
    }
}

/// A sub-repository selected by application/profile patterns.
struct PatternRepository {
    name: String,
    patterns: RepoPatterns,
    handle: RepoHandle,
}

/// A Git backend: one primary repository plus pattern-scoped sub-repositories.
///
/// The first sub-repository whose patterns match a query serves it; queries
/// nobody claims go to the primary repository.
pub struct GitHandle {
    name: String,
    primary: RepoHandle,
    repos: Vec<PatternRepository>,
    factory: Arc<ProxyAwareConnectionFactory>,
}

impl GitHandle {
    pub fn new(
        name: impl Into<String>,
        settings: GitRepoSettings,
        factory: Arc<ProxyAwareConnectionFactory>,
    ) -> Self {
        Self {
            name: name.into(),
            primary: RepoHandle::new(settings),
            repos: Vec::new(),
            factory,
        }
    }

    /// Adds a sub-repository. Sub-repositories are tried in insertion order.
    pub fn with_repository(
        mut self,
        name: impl Into<String>,
        patterns: &[String],
        settings: GitRepoSettings,
    ) -> Result<Self, ConfigSourceError> {
        let name = name.into();
        let patterns = RepoPatterns::new(&name, patterns)?;
        self.repos.push(PatternRepository {
            name,
            patterns,
            handle: RepoHandle::new(settings),
        });
        Ok(self)
    }

    pub fn settings(&self) -> &GitRepoSettings {
        self.primary.settings()
    }

    /// Settings of a sub-repository by name.
    pub fn repository(&self, name: &str) -> Option<&GitRepoSettings> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.handle.settings())
    }

    /// Names of the sub-repositories in matching order.
    pub fn repository_names(&self) -> Vec<&str> {
        self.repos.iter().map(|r| r.name.as_str()).collect()
    }

    /// Returns the name of the sub-repository serving `query`, if any.
    pub fn select(&self, query: &ConfigQuery) -> Option<&str> {
        self.select_repo(query).map(|r| r.name.as_str())
    }

    fn select_repo(&self, query: &ConfigQuery) -> Option<&PatternRepository> {
        self.repos
            .iter()
            .find(|r| r.patterns.matches(query.application(), query.profiles()))
    }

    fn all_handles(&self) -> impl Iterator<Item = &RepoHandle> {
        std::iter::once(&self.primary).chain(self.repos.iter().map(|r| &r.handle))
    }

    /// Clones every repository configured with clone-on-start.
    pub async fn initialize(&self) -> Result<(), ConfigSourceError> {
        for handle in self.all_handles().filter(|h| h.settings().clone_on_start()) {
            info!(backend = %self.name, uri = %handle.settings().uri(), "Cloning on start");
            let cloned = handle.repository.ensure_cloned(self.factory.clone()).await;
            self.factory.drain().await;
            cloned?;
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigSource for GitHandle {
    #[instrument(skip(self, session), fields(backend = %self.name))]
    async fn fetch(
        &self,
        query: &ConfigQuery,
        session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        let handle = match self.select_repo(query) {
            Some(repo) => {
                debug!(repository = %repo.name, "Query matched sub-repository");
                &repo.handle
            },
            None => &self.primary,
        };

        let snapshot = handle.fetch(query, session).await?;
        debug!("Resolved {} property sources for {}", snapshot.len(), query);
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
        self.factory.clone()
    }

    async fn health_check(&self) -> Result<(), ConfigSourceError> {
        for handle in self.all_handles() {
            if let RepoState::Error(reason) = handle.repository.state() {
                return Err(ConfigSourceError::unavailable(format!(
                    "{}: {}",
                    handle.settings().uri(),
                    reason
                )));
            }
        }
        Ok(())
    }

    fn default_label(&self) -> &str {
        self.settings().default_label()
    }
}

impl std::fmt::Debug for GitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHandle")
            .field("name", &self.name)
            .field("uri", &self.settings().uri())
            .field("repos", &self.repository_names())
            .finish()
    }
}
