//! Application-wide error type shared across crates.

use thiserror::Error;

/// Result type alias for Concierge operations.
pub type Result<T> = std::result::Result<T, ConciergeError>;

/// Main error type for Concierge operations.
#[derive(Error, Debug)]
pub enum ConciergeError {
    /// Configuration related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for user input.
    #[error("{message}")]
    Validation {
        /// Human readable description, shown to the requester.
        message: String,
        /// Offending input, when there is one.
        field: Option<String>,
    },
}

impl ConciergeError {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error tied to a specific input.
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error should be reported back to the user verbatim.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_is_bare_message() {
        let err = ConciergeError::validation_field("Unknown time unit 'x'", "10x");
        assert_eq!(err.to_string(), "Unknown time unit 'x'");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConciergeError = io.into();
        assert!(matches!(err, ConciergeError::Io(_)));
        assert!(!err.is_user_facing());
    }
}
