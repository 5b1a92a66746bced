//! Proxy settings as they arrive from configuration.

use std::fmt;

use serde::Deserialize;

/// Forward proxy settings for one target scheme.
///
/// Empty strings and a zero port mean "not set".
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyHostSettings {
    pub host: String,
    pub port: u16,
    /// `|`-separated host patterns that bypass the proxy, e.g. `localhost|*.corp`.
    pub non_proxy_hosts: String,
    pub username: String,
    pub password: String,
}

impl ProxyHostSettings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_non_proxy_hosts(mut self, patterns: impl Into<String>) -> Self {
        self.non_proxy_hosts = patterns.into();
        self
    }

    /// A scope is usable when it names a host and a non-zero port.
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty() && self.port > 0
    }

    /// Credentials count only when both halves are present.
    pub fn has_credentials(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }

    /// True when nothing at all was set for this scope.
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

impl fmt::Debug for ProxyHostSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHostSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("non_proxy_hosts", &self.non_proxy_hosts)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Proxy settings for a backend, keyed by the scheme of the target URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<ProxyHostSettings>,
    pub https: Option<ProxyHostSettings>,
}

impl ProxySettings {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn http(settings: ProxyHostSettings) -> Self {
        Self {
            http: Some(settings),
            https: None,
        }
    }

    pub fn https(settings: ProxyHostSettings) -> Self {
        Self {
            http: None,
            https: Some(settings),
        }
    }

    pub fn both(http: ProxyHostSettings, https: ProxyHostSettings) -> Self {
        Self {
            http: Some(http),
            https: Some(https),
        }
    }

    /// Returns the settings that apply to targets with the given URL scheme.
    pub fn for_scheme(&self, scheme: &str) -> Option<&ProxyHostSettings> {
        match scheme {
            "http" => self.http.as_ref(),
            "https" => self.https.as_ref(),
            _ => None,
        }
        .filter(|s| s.is_configured())
    }
}
