//! Connection factory bound to one proxy-configured client.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::Mutex as AsyncMutex;

use crate::client::{ProxyClient, build_client};
use crate::connection::ProxyAwareConnection;
use crate::error::{Result, TransportError};
use crate::settings::ProxySettings;
use crate::topology::ProxyTopology;

/// A connection shared between the factory's slot and its user.
pub type SharedConnection = Arc<AsyncMutex<ProxyAwareConnection>>;

/// Opens [`ProxyAwareConnection`]s on one client.
///
/// The factory tracks the most recently opened connection in a single slot.
/// Opening a new connection closes the previous one, and [`drain`](Self::drain)
/// closes whatever is left, so at most one exchange per factory holds pool
/// resources at a time.
#[derive(Debug)]
pub struct ProxyAwareConnectionFactory {
    client: ProxyClient,
    current: Mutex<Option<SharedConnection>>,
    opened: AtomicUsize,
    releases: Arc<AtomicUsize>,
}

impl ProxyAwareConnectionFactory {
    pub fn new(client: ProxyClient) -> Self {
        Self {
            client,
            current: Mutex::new(None),
            opened: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds the client for `settings` and wraps it.
    pub fn from_settings(settings: &ProxySettings) -> Result<Self> {
        Ok(Self::new(build_client(settings)?))
    }

    pub fn topology(&self) -> &ProxyTopology {
        self.client.topology()
    }

    /// Opens a connection to `url`, closing the previous one first.
    pub async fn open(&self, url: &str) -> Result<SharedConnection> {
        let url = Url::parse(url).map_err(|e| TransportError::invalid_url(url, e))?;
        self.drain().await;

        let connection = Arc::new(AsyncMutex::new(ProxyAwareConnection::new(
            self.client.client().clone(),
            url,
            self.releases.clone(),
        )));
        *self.current.lock() = Some(connection.clone());
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(connection)
    }

    /// Closes the tracked connection, if any.
    pub async fn drain(&self) {
        let previous = self.current.lock().take();
        if let Some(connection) = previous {
            connection.lock().await.close().await;
        }
    }

    /// Number of connections opened so far.
    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of connections that released their resources.
    pub fn released_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_closes_previous_connection() {
        let factory = ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap();

        let first = factory.open("http://127.0.0.1:9/a").await.unwrap();
        let _second = factory.open("http://127.0.0.1:9/b").await.unwrap();

        assert!(first.lock().await.state() == crate::ConnectionState::Closed);
        assert_eq!(factory.opened_count(), 2);
        assert_eq!(factory.released_count(), 1);

        factory.drain().await;
        factory.drain().await;
        assert_eq!(factory.released_count(), 2);
    }

    #[tokio::test]
    async fn test_open_rejects_bad_url() {
        let factory = ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap();

        assert!(matches!(
            factory.open("not a url").await,
            Err(TransportError::InvalidUrl { .. })
        ));
        assert_eq!(factory.opened_count(), 0);
    }
}
