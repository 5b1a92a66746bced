//! Error types for configuration sources.

use std::path::PathBuf;

use prism_transport::TransportError;

/// Errors that can occur when a backend resolves configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigSourceError {
    /// The requested label (branch/tag/commit) was not found.
    #[error("label not found: {0}")]
    LabelNotFound(String),

    /// The configuration source is not available.
    #[error("source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A Git operation failed.
    #[error("git error: {0}")]
    Git(String),

    /// Failed to parse a configuration file or payload.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The configuration format is not supported.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A remote answered with a status the backend cannot use.
    #[error("{url} answered HTTP {status}")]
    RemoteStatus { url: String, status: u16 },

    /// Outbound HTTP through the proxy-aware transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A timeout occurred while waiting for an operation.
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The local clone is being replaced.
    #[error("source is refreshing, try again later")]
    Refreshing,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConfigSourceError {
    /// Creates a new Git error.
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }

    pub fn remote_status(url: impl Into<String>, status: u16) -> Self {
        Self::RemoteStatus {
            url: url.into(),
            status,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SourceUnavailable { .. } | Self::Timeout { .. } | Self::Refreshing => true,
            Self::RemoteStatus { status, .. } => *status >= 500,
            Self::Transport(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigSourceError::LabelNotFound("feature/test".to_string());
        assert_eq!(err.to_string(), "label not found: feature/test");

        let err = ConfigSourceError::git("failed to clone");
        assert_eq!(err.to_string(), "git error: failed to clone");

        let err = ConfigSourceError::parse("/config/app.yml", "invalid YAML");
        assert_eq!(err.to_string(), "parse error in /config/app.yml: invalid YAML");

        let err = ConfigSourceError::remote_status("http://vault:8200/v1/secret/app", 403);
        assert_eq!(err.to_string(), "http://vault:8200/v1/secret/app answered HTTP 403");
    }

    #[test]
    fn test_transport_errors_convert() {
        let err: ConfigSourceError = TransportError::UnsupportedMethod("PATCH".into()).into();
        assert!(matches!(err, ConfigSourceError::Transport(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_is_transient() {
        assert!(ConfigSourceError::unavailable("network error").is_transient());
        assert!(ConfigSourceError::Timeout { seconds: 30 }.is_transient());
        assert!(ConfigSourceError::Refreshing.is_transient());
        assert!(ConfigSourceError::remote_status("u", 503).is_transient());
        assert!(!ConfigSourceError::remote_status("u", 403).is_transient());
        assert!(!ConfigSourceError::git("error").is_transient());
    }
}
