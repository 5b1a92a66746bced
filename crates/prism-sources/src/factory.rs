//! Turns backend descriptors into live handles.

use std::sync::Arc;

use prism_git::{ConfigSource, GitHandle};
use prism_transport::ProxyAwareConnectionFactory;
use tracing::info;

use crate::descriptor::{BackendDescriptor, BackendKind};
use crate::error::CompositeError;
use crate::vault::{VaultHandle, VaultSettings};

/// A handle the composite can query.
pub type BackendHandle = Arc<dyn ConfigSource>;

/// Builds backend handles. Stateless; every handle gets its own
/// proxy-aware connection factory built from its descriptor's proxy settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackendFactory;

impl BackendFactory {
    pub fn new() -> Self {
        Self
    }

    /// Builds a Git handle with its sub-repositories.
    ///
    /// Repositories configured with clone-on-start are cloned before this
    /// returns; a failed clone fails the whole handle.
    pub async fn build_git_handle(
        &self,
        name: &str,
        descriptor: &BackendDescriptor,
    ) -> Result<GitHandle, CompositeError> {
        let settings = descriptor
            .base
            .to_git_settings()
            .map_err(|e| CompositeError::initialization(name, e))?;
        let mut handle = GitHandle::new(name, settings, self.connection_factory(name, descriptor)?);

        for (key, sub) in &descriptor.repos {
            let repo_name = sub.name_or(key);
            let settings = sub
                .resolve_against(repo_name, &descriptor.base)
                .to_git_settings()
                .map_err(|e| CompositeError::initialization(name, e))?;
            handle = handle
                .with_repository(repo_name, &sub.pattern, settings)
                .map_err(|e| CompositeError::initialization(name, e))?;
        }

        handle
            .initialize()
            .await
            .map_err(|e| CompositeError::initialization(name, e))?;

        info!(
            backend = %name,
            uri = %handle.settings().uri(),
            repos = ?handle.repository_names(),
            "Built git backend"
        );
        Ok(handle)
    }

    /// Builds a secret-store handle. Nothing is contacted until the first query.
    pub fn build_secret_store_handle(
        &self,
        name: &str,
        descriptor: &BackendDescriptor,
    ) -> Result<VaultHandle, CompositeError> {
        let settings = VaultSettings::from_descriptor(descriptor);
        let handle = VaultHandle::new(name, settings, self.connection_factory(name, descriptor)?);

        info!(backend = %name, url = %handle.settings().base_url(), "Built vault backend");
        Ok(handle)
    }

    /// Builds the handle for the descriptor at `index` of the composite list.
    pub async fn build(&self, index: usize, descriptor: &BackendDescriptor) -> Result<BackendHandle, CompositeError> {
        let kind = BackendKind::parse(&descriptor.kind).ok_or_else(|| CompositeError::UnrecognizedBackendKind {
            index,
            kind: descriptor.kind.clone(),
        })?;
        let name = format!("{}[{}]", kind, index);

        let handle: BackendHandle = match kind {
            BackendKind::Git => Arc::new(self.build_git_handle(&name, descriptor).await?),
            BackendKind::Vault => Arc::new(self.build_secret_store_handle(&name, descriptor)?),
        };
        Ok(handle)
    }

    /// Builds every handle in declaration order.
    ///
    /// Kinds are checked up front, so an unrecognized kind fails before any
    /// repository is cloned.
    pub async fn build_all(&self, descriptors: &[BackendDescriptor]) -> Result<Vec<BackendHandle>, CompositeError> {
        if let Some((index, descriptor)) = descriptors
            .iter()
            .enumerate()
            .find(|(_, d)| BackendKind::parse(&d.kind).is_none())
        {
            return Err(CompositeError::UnrecognizedBackendKind {
                index,
                kind: descriptor.kind.clone(),
            });
        }

        let mut handles = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            handles.push(self.build(index, descriptor).await?);
        }
        Ok(handles)
    }

    fn connection_factory(
        &self,
        name: &str,
        descriptor: &BackendDescriptor,
    ) -> Result<Arc<ProxyAwareConnectionFactory>, CompositeError> {
        ProxyAwareConnectionFactory::from_settings(&descriptor.proxy)
            .map(Arc::new)
            .map_err(|e| CompositeError::initialization(name, e))
    }
}
