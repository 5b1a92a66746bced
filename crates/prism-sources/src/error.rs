//! Errors raised while wiring backends and resolving the composite.

use prism_git::ConfigSourceError;

/// Composite-level failures. Every variant names the backend involved.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// A descriptor's `type` is not a known backend kind.
    #[error("backend {index} has unrecognized type '{kind}'")]
    UnrecognizedBackendKind { index: usize, kind: String },

    /// Building a handle failed at startup, including eager clones.
    #[error("backend {backend} failed to initialize: {source}")]
    BackendInitialization {
        backend: String,
        #[source]
        source: ConfigSourceError,
    },

    /// A backend failed during a live resolution.
    #[error("backend {backend} failed to resolve: {source}")]
    BackendResolution {
        backend: String,
        #[source]
        source: ConfigSourceError,
    },
}

impl CompositeError {
    pub fn initialization(backend: impl Into<String>, source: impl Into<ConfigSourceError>) -> Self {
        Self::BackendInitialization {
            backend: backend.into(),
            source: source.into(),
        }
    }

    pub fn resolution(backend: impl Into<String>, source: ConfigSourceError) -> Self {
        Self::BackendResolution {
            backend: backend.into(),
            source,
        }
    }

    /// Name of the failing backend, e.g. `git[0]`.
    pub fn backend(&self) -> String {
        match self {
            Self::UnrecognizedBackendKind { index, kind } => format!("{}[{}]", kind, index),
            Self::BackendInitialization { backend, .. } | Self::BackendResolution { backend, .. } => {
                backend.clone()
            },
        }
    }

    /// Returns true for errors raised while wiring backends at startup.
    pub fn is_startup(&self) -> bool {
        !matches!(self, Self::BackendResolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_backend() {
        let err = CompositeError::resolution("vault[1]", ConfigSourceError::remote_status("http://v/x", 503));
        assert_eq!(err.backend(), "vault[1]");
        assert!(err.to_string().contains("vault[1]"));
        assert!(err.to_string().contains("503"));
        assert!(!err.is_startup());

        let err = CompositeError::UnrecognizedBackendKind {
            index: 2,
            kind: "svn".to_string(),
        };
        assert_eq!(err.backend(), "svn[2]");
        assert!(err.is_startup());
    }
}
