//! Secret-store backend reading a Vault KV engine over HTTP.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use prism_core::{ConfigMap, PropertySource};
use prism_git::{ConfigQuery, ConfigSnapshot, ConfigSource, ConfigSourceError};
use prism_transport::{ProxyAwareConnectionFactory, TransportSession};
use tracing::{debug, instrument};

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Connection settings of a Vault handle.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultSettings {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Mount point of the KV engine.
    pub backend: String,
    pub default_key: String,
    pub profile_separator: String,
    /// KV engine version, 1 or 2.
    pub kv_version: u8,
    pub token: Option<String>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8200,
            backend: "secret".to_string(),
            default_key: "application".to_string(),
            profile_separator: ",".to_string(),
            kv_version: 1,
            token: None,
        }
    }
}

impl VaultSettings {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// URL of the secret stored under `key`.
    pub fn secret_url(&self, key: &str) -> String {
        let backend = self.backend.trim_matches('/');
        if self.kv_version >= 2 {
            format!("{}/v1/{}/data/{}", self.base_url(), backend, key)
        } else {
            format!("{}/v1/{}/{}", self.base_url(), backend, key)
        }
    }

    /// Keys to read for a query, highest precedence first.
    pub fn keys(&self, application: &str, profiles: &[String]) -> Vec<String> {
        let mut keys = Vec::new();
        self.push_keys(&mut keys, application, profiles);
        if application != self.default_key {
            self.push_keys(&mut keys, &self.default_key, profiles);
        }
        keys
    }

    fn push_keys(&self, keys: &mut Vec<String>, context: &str, profiles: &[String]) {
        for profile in profiles.iter().rev() {
            keys.push(format!("{}{}{}", context, self.profile_separator, profile));
        }
        keys.push(context.to_string());
    }
}

impl fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSettings")
            .field("url", &self.base_url())
            .field("backend", &self.backend)
            .field("default_key", &self.default_key)
            .field("profile_separator", &self.profile_separator)
            .field("kv_version", &self.kv_version)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// A backend serving secrets as property sources named `vault:<key>`.
pub struct VaultHandle {
    name: String,
    settings: VaultSettings,
    factory: Arc<ProxyAwareConnectionFactory>,
}

impl VaultHandle {
    pub fn new(
        name: impl Into<String>,
        settings: VaultSettings,
        factory: Arc<ProxyAwareConnectionFactory>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            factory,
        }
    }

    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Reads one key. `None` when nothing is stored there.
    async fn read_secret(
        &self,
        key: &str,
        session: &TransportSession<'_>,
    ) -> Result<Option<ConfigMap>, ConfigSourceError> {
        let url = self.settings.secret_url(key);
        let connection = session.open(&url).await?;
        let mut connection = connection.lock().await;
        connection.set_request_property("Accept", "application/json")?;
        if let Some(token) = &self.settings.token {
            connection.set_request_property(TOKEN_HEADER, token)?;
        }

        let status = connection.status_code().await?;
        if status == 404 {
            debug!(key, "No secrets stored");
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(ConfigSourceError::remote_status(url, status));
        }

        let payload: serde_json::Value = serde_json::from_slice(connection.body().await?)
            .map_err(|e| ConfigSourceError::parse(&url, e.to_string()))?;
        let pointer = if self.settings.kv_version >= 2 { "/data/data" } else { "/data" };
        let data = match payload.pointer(pointer) {
            None | Some(serde_json::Value::Null) => return Ok(Some(ConfigMap::new())),
            Some(data) => data.clone(),
        };

        serde_json::from_value(data)
            .map(Some)
            .map_err(|e| ConfigSourceError::parse(&url, e.to_string()))
    }
}

#[async_trait]
impl ConfigSource for VaultHandle {
    #[instrument(skip(self, session), fields(backend = %self.name))]
    async fn fetch(
        &self,
        query: &ConfigQuery,
        session: &TransportSession<'_>,
    ) -> Result<ConfigSnapshot, ConfigSourceError> {
        let mut snapshot = ConfigSnapshot::new(
            query.application(),
            query.profiles().to_vec(),
            query.effective_label(self.default_label()),
        );

        for key in self.settings.keys(query.application(), query.profiles()) {
            if let Some(config) = self.read_secret(&key, session).await? {
                snapshot.add_property_source(PropertySource::new(format!("vault:{}", key), config));
            }
        }

        debug!("Resolved {} property sources for {}", snapshot.len(), query);
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_factory(&self) -> Arc<ProxyAwareConnectionFactory> {
        self.factory.clone()
    }
}

impl fmt::Debug for VaultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultHandle")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .finish()
    }
}
