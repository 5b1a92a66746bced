//! Error types for the proxy-aware transport.

/// Errors raised while building clients or driving a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection adapter only speaks GET, HEAD, PUT and POST.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("cannot {operation} while connection is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// A target or proxy URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A request header name or value was rejected.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Sending the request or reading the response failed.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request body buffer could not be written or replayed.
    #[error("request body buffer error: {0}")]
    Buffer(#[from] std::io::Error),

    /// No connection factory has been installed in the session.
    #[error("no active connection factory installed")]
    NoActiveFactory,
}

impl TransportError {
    /// Creates a new invalid state error.
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Creates a new invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new request error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Returns true if this error came from the network rather than from misuse.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::UnsupportedMethod("DELETE".to_string());
        assert_eq!(err.to_string(), "unsupported HTTP method: DELETE");

        let err = TransportError::invalid_state("set request method", "executed");
        assert_eq!(
            err.to_string(),
            "cannot set request method while connection is executed"
        );

        let err = TransportError::invalid_url("::nope", "relative URL without a base");
        assert!(err.to_string().contains("::nope"));
    }

    #[test]
    fn test_misuse_is_not_transient() {
        assert!(!TransportError::UnsupportedMethod("PATCH".into()).is_transient());
        assert!(!TransportError::NoActiveFactory.is_transient());
    }
}
