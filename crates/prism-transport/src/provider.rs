//! Scoped access to the active connection factory.
//!
//! Only one factory is active at a time. A resolution takes a
//! [`TransportSession`] for its whole duration; while the session lives, no
//! other resolution can install a factory or open connections, so the
//! "install, query, drain" sequence of one backend never interleaves with
//! another request's.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::client::ProxyClient;
use crate::error::{Result, TransportError};
use crate::factory::{ProxyAwareConnectionFactory, SharedConnection};

/// Hands out exclusive sessions over the active factory slot.
#[derive(Debug, Default)]
pub struct ConnectionFactoryProvider {
    active: Mutex<Option<Arc<ProxyAwareConnectionFactory>>>,
}

impl ConnectionFactoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of the active factory slot.
    pub async fn session(&self) -> TransportSession<'_> {
        TransportSession {
            active: self.active.lock().await,
        }
    }
}

/// Exclusive access to the active factory. Dropping the session releases it.
#[derive(Debug)]
pub struct TransportSession<'a> {
    active: MutexGuard<'a, Option<Arc<ProxyAwareConnectionFactory>>>,
}

impl TransportSession<'_> {
    /// Makes `factory` the active one.
    pub fn install(&mut self, factory: Arc<ProxyAwareConnectionFactory>) {
        debug!(topology = factory.topology().kind(), "Installing connection factory");
        *self.active = Some(factory);
    }

    /// Wraps `client` in a fresh factory and installs it.
    pub fn install_client(&mut self, client: ProxyClient) -> Arc<ProxyAwareConnectionFactory> {
        let factory = Arc::new(ProxyAwareConnectionFactory::new(client));
        self.install(factory.clone());
        factory
    }

    pub fn active(&self) -> Option<&Arc<ProxyAwareConnectionFactory>> {
        self.active.as_ref()
    }

    /// Opens a connection on the active factory.
    pub async fn open(&self, url: &str) -> Result<SharedConnection> {
        let factory = self.active().ok_or(TransportError::NoActiveFactory)?;
        factory.open(url).await
    }

    /// Closes the active factory's connection and uninstalls it.
    pub async fn drain(&mut self) {
        if let Some(factory) = self.active.take() {
            factory.drain().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProxySettings;

    fn factory() -> Arc<ProxyAwareConnectionFactory> {
        Arc::new(ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap())
    }

    #[tokio::test]
    async fn test_open_without_factory_fails() {
        let provider = ConnectionFactoryProvider::new();
        let session = provider.session().await;

        assert!(matches!(
            session.open("http://127.0.0.1:9/").await,
            Err(TransportError::NoActiveFactory)
        ));
    }

    #[tokio::test]
    async fn test_drain_releases_and_uninstalls() {
        let provider = ConnectionFactoryProvider::new();
        let factory = factory();

        let mut session = provider.session().await;
        session.install(factory.clone());
        session.open("http://127.0.0.1:9/").await.unwrap();
        session.drain().await;

        assert!(session.active().is_none());
        assert_eq!(factory.released_count(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_exclusive() {
        let provider = Arc::new(ConnectionFactoryProvider::new());
        let session = provider.session().await;

        let contender = provider.clone();
        let waiting = tokio::spawn(async move {
            let _session = contender.session().await;
        });

        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        drop(session);
        waiting.await.unwrap();
    }
}
