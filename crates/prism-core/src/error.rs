//! Error types shared by the Prism domain layer.
//!
//! Everything that can go wrong while turning raw configuration text into
//! [`ConfigMap`](crate::ConfigMap) values is expressed as a [`PrismError`].
//! Backend and transport crates define their own error enums and wrap this
//! one where a parse failure bubbles up through them.
//!
//! # Example
//!
//! ```
//! use prism_core::{PrismError, Result};
//!
//! fn application_name(raw: &str) -> Result<&str> {
//!     if raw.trim().is_empty() {
//!         return Err(PrismError::validation_error("application", "must not be blank"));
//!     }
//!     Ok(raw)
//! }
//!
//! assert!(application_name("  ").unwrap_err().is_validation_error());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for domain-level operations.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration from '{source_name}': {message}")]
    ParseError {
        /// Source of the configuration (file name, secret path, ...)
        source_name: String,
        /// Description of the parse error
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A value failed validation.
    #[error("Validation error for field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PrismError {
    /// Creates a ParseError without a cause.
    pub fn parse_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a ParseError with a cause.
    pub fn parse_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a ValidationError.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a parse error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Type alias for Results with PrismError.
pub type Result<T> = std::result::Result<T, PrismError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_display_names_source() {
        let error = PrismError::parse_error("application.yml", "bad indentation at line 4");
        let msg = error.to_string();

        assert!(msg.contains("application.yml"));
        assert!(msg.contains("line 4"));
        assert!(error.is_parse_error());
    }

    #[test]
    fn test_parse_error_keeps_cause() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error = PrismError::parse_error_with_cause("repo.yml", "could not read", io_error);

        assert!(error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: PrismError = io_error.into();

        assert!(error.is_io_error());
        assert!(!error.is_validation_error());
    }

    #[test]
    fn test_question_mark_propagation() {
        fn inner() -> Result<()> {
            Err(PrismError::internal("boom"))
        }

        fn outer() -> Result<u8> {
            inner()?;
            Ok(1)
        }

        assert!(matches!(outer(), Err(PrismError::Internal(_))));
    }
}
