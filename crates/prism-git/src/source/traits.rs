//! Configuration source trait definition.

use std::sync::Arc;

use async_trait::async_trait;
use prism_transport::{ProxyAwareConnectionFactory, TransportSession};

use super::{ConfigQuery, ConfigSnapshot};
use crate::error::ConfigSourceError;

/// A backend the composite can resolve configuration from.
///
/// Implementations are built once at startup and shared read-only between
/// requests. Any outbound HTTP a backend needs goes through the session it is
/// handed, after the caller installed [`connection_factory`](Self::connection_factory)
/// as the active factory.
///
/// # Implementors
///
/// - `GitHandle` - Spring-style files from one or more Git repositories
/// - `VaultHandle` (prism-sources) - secrets from a Vault KV engine
///
/// # Example
///
/// ```ignore
/// use prism_git::{ConfigSource, ConfigQuery, ConfigSnapshot};
///
/// struct MySource { factory: Arc<ProxyAwareConnectionFactory> }
///
/// #[async_trait]
/// impl ConfigSource for MySource {
///     async fn fetch(
///         &self,
///         query: &ConfigQuery,
///         session: &TransportSession<'_>,
///     ) -> Result<ConfigSnapshot, ConfigSourceError> {
///         // Implementation here
///     }
///
///     fn name(&self) -> &str {
///         "my-source"
///     }
///
///     fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
///         self.factory.clone()
///     }
/// }
/// ```
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetches configuration for the given query.
    ///
    /// Property sources are returned highest precedence first.
    ///
    /// # Errors
    ///
    /// - `ConfigSourceError::LabelNotFound` if the branch/tag doesn't exist
    /// - `ConfigSourceError::SourceUnavailable` if the source is not accessible
    /// - `ConfigSourceError::Transport` if outbound HTTP failed
    async fn fetch(
        &self,
        query: &ConfigQuery,
        session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError>;

    /// Returns the display name of this source, e.g. `git[0]`.
    ///
    /// This is used for logging and error reporting.
    fn name(&self) -> &str;

    /// The factory to install before calling [`fetch`](Self::fetch).
    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory>;

    /// Performs a cheap local health check. No network access.
    async fn health_check(&self) -> Result<(), ConfigSourceError> {
        Ok(())
    }

    /// Returns the default label for this source.
    ///
    /// For Git sources, this is typically "main" or "master".
    fn default_label(&self) -> &str {
        "main"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_transport::{ConnectionFactoryProvider, ProxySettings};

    struct MockSource {
        name: String,
        factory: Arc<ProxyAwareConnectionFactory>,
    }

    #[async_trait]
    impl ConfigSource for MockSource {
        async fn fetch(
            &self,
            query: &ConfigQuery,
            _session: &TransportSession<'_>,
        ) -> Result<ConfigSnapshot, ConfigSourceError> {
            Ok(ConfigSnapshot::new(
                query.application(),
                query.profiles().to_vec(),
                query.effective_label(self.default_label()),
            ))
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
            self.factory.clone()
        }
    }

    fn mock() -> MockSource {
        MockSource {
            name: "mock".to_string(),
            factory: Arc::new(ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_mock_source() {
        let source = mock();
        let provider = ConnectionFactoryProvider::new();
        let mut session = provider.session().await;
        session.install(source.connection_factory());

        let query = ConfigQuery::new("myapp", vec!["dev"]);
        let snapshot = source.fetch(&query, &session).await.unwrap();

        assert_eq!(snapshot.name(), "myapp");
        assert_eq!(snapshot.profiles(), &["dev"]);
        assert_eq!(snapshot.label(), "main");
    }

    #[tokio::test]
    async fn test_default_health_check() {
        assert!(mock().health_check().await.is_ok());
    }
}
