//! Declarative backend descriptors as they arrive from configuration.
//!
//! Descriptors are plain data: every field has a zero value meaning "not
//! set", which the overlay functions in [`crate::overlay`] rely on.

use std::fmt;

use indexmap::IndexMap;
use prism_transport::ProxySettings;
use serde::Deserialize;

/// Fields shared by a backend descriptor and its sub-repository overrides.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseBackendFields {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub search_paths: Vec<String>,
    pub basedir: String,
    pub default_label: String,
    pub clone_on_start: bool,
    pub force_pull: bool,
}

impl fmt::Debug for BaseBackendFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseBackendFields")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("search_paths", &self.search_paths)
            .field("basedir", &self.basedir)
            .field("default_label", &self.default_label)
            .field("clone_on_start", &self.clone_on_start)
            .field("force_pull", &self.force_pull)
            .finish()
    }
}

/// A named, pattern-scoped override of a Git backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubRepositoryDescriptor {
    #[serde(flatten)]
    pub base: BaseBackendFields,
    /// Defaults to the key under which the override is declared.
    pub name: String,
    pub pattern: Vec<String>,
}

/// One entry of the composite list.
///
/// Git backends read `base` and `repos`; secret-store backends read the
/// connection fields. `proxy` applies to both.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub base: BaseBackendFields,
    pub host: String,
    pub scheme: String,
    pub port: u16,
    /// Secret engine mount point.
    pub backend: String,
    pub profile_separator: String,
    pub default_key: String,
    pub token: String,
    pub kv_version: u8,
    pub proxy: ProxySettings,
    pub repos: IndexMap<String, SubRepositoryDescriptor>,
}

impl BackendDescriptor {
    pub fn git(uri: impl Into<String>) -> Self {
        Self {
            kind: "git".to_string(),
            base: BaseBackendFields {
                uri: uri.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn vault(host: impl Into<String>, port: u16) -> Self {
        Self {
            kind: "vault".to_string(),
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_repo(mut self, key: impl Into<String>, repo: SubRepositoryDescriptor) -> Self {
        self.repos.insert(key.into(), repo);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = proxy;
        self
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("kind", &self.kind)
            .field("base", &self.base)
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("port", &self.port)
            .field("backend", &self.backend)
            .field("profile_separator", &self.profile_separator)
            .field("default_key", &self.default_key)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("kv_version", &self.kv_version)
            .field("proxy", &self.proxy)
            .field("repos", &self.repos)
            .finish()
    }
}

/// The backend kinds the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Git,
    Vault,
}

impl BackendKind {
    /// Parses a descriptor `type`, ignoring case.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "git" => Some(Self::Git),
            "vault" => Some(Self::Vault),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Vault => "vault",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
