//! Settings of one Git repository.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigSourceError;

/// Settings for a single repository, primary or pattern-scoped.
#[derive(Clone)]
pub struct GitRepoSettings {
    uri: String,
    basedir: PathBuf,
    default_label: String,
    search_paths: Vec<String>,
    clone_timeout: Duration,
    fetch_timeout: Duration,
    clone_on_start: bool,
    force_pull: bool,
    username: Option<String>,
    password: Option<String>,
}

fn default_label() -> String {
    "main".to_string()
}

fn default_clone_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Working directory used when none is configured: `<tmp>/prism-config/<uri>`
/// with every character outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn default_basedir(uri: &str) -> PathBuf {
    let sanitized: String = uri
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || "._-".contains(c) { c } else { '_' })
        .collect();
    std::env::temp_dir().join("prism-config").join(sanitized)
}

impl GitRepoSettings {
    /// Creates a new builder for GitRepoSettings.
    pub fn builder() -> GitRepoSettingsBuilder {
        GitRepoSettingsBuilder::default()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Directory holding the local bare clone.
    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn search_paths(&self) -> &[String] {
        &self.search_paths
    }

    pub fn clone_timeout(&self) -> Duration {
        self.clone_timeout
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn clone_on_start(&self) -> bool {
        self.clone_on_start
    }

    /// Whether every query refreshes the clone, whatever the remote advertises.
    pub fn force_pull(&self) -> bool {
        self.force_pull
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Username and password, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username().zip(self.password())
    }

    /// Returns true for `http://` and `https://` remotes.
    pub fn is_http_remote(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }

    /// Returns a builder seeded with these settings.
    pub fn to_builder(&self) -> GitRepoSettingsBuilder {
        GitRepoSettingsBuilder {
            uri: Some(self.uri.clone()),
            basedir: Some(self.basedir.clone()),
            default_label: Some(self.default_label.clone()),
            search_paths: self.search_paths.clone(),
            clone_timeout: Some(self.clone_timeout),
            fetch_timeout: Some(self.fetch_timeout),
            clone_on_start: self.clone_on_start,
            force_pull: self.force_pull,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for GitRepoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepoSettings")
            .field("uri", &self.uri)
            .field("basedir", &self.basedir)
            .field("default_label", &self.default_label)
            .field("search_paths", &self.search_paths)
            .field("clone_on_start", &self.clone_on_start)
            .field("force_pull", &self.force_pull)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Builder for GitRepoSettings.
#[derive(Debug, Default)]
pub struct GitRepoSettingsBuilder {
    uri: Option<String>,
    basedir: Option<PathBuf>,
    default_label: Option<String>,
    search_paths: Vec<String>,
    clone_timeout: Option<Duration>,
    fetch_timeout: Option<Duration>,
    clone_on_start: bool,
    force_pull: bool,
    username: Option<String>,
    password: Option<String>,
}

impl GitRepoSettingsBuilder {
    /// Sets the Git repository URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the directory of the local clone.
    pub fn basedir(mut self, path: impl Into<PathBuf>) -> Self {
        self.basedir = Some(path.into());
        self
    }

    /// Sets the default label (branch/tag).
    pub fn default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = Some(label.into());
        self
    }

    /// Sets the search paths.
    pub fn search_paths(mut self, paths: Vec<impl Into<String>>) -> Self {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = Some(timeout);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn clone_on_start(mut self, clone: bool) -> Self {
        self.clone_on_start = clone;
        self
    }

    pub fn force_pull(mut self, force: bool) -> Self {
        self.force_pull = force;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets basic authentication credentials.
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is missing or blank.
    pub fn build(self) -> Result<GitRepoSettings, ConfigSourceError> {
        let uri = self
            .uri
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigSourceError::InvalidConfig("uri is required".to_string()))?;
        let basedir = self.basedir.unwrap_or_else(|| default_basedir(&uri));

        Ok(GitRepoSettings {
            uri,
            basedir,
            default_label: self.default_label.unwrap_or_else(default_label),
            search_paths: self.search_paths,
            clone_timeout: self.clone_timeout.unwrap_or_else(default_clone_timeout),
            fetch_timeout: self.fetch_timeout.unwrap_or_else(default_fetch_timeout),
            clone_on_start: self.clone_on_start,
            force_pull: self.force_pull,
            username: self.username,
            password: self.password,
        })
    }
}
