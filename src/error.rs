//! Error types for the Kairos renewal intelligence core
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for Kairos operations
#[derive(Error, Debug)]
pub enum KairosError {
    /// Unknown account id on selection
    #[error("Account not found: {0}")]
    NotFound(String),

    /// Override or lookup attempted with invalid input (out-of-range index,
    /// missing active question). The prior state is unchanged.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collaborator call failed, timed out, or returned unparsable content.
    /// Recovered locally by the session into a degraded brief.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Kairos operations
pub type Result<T> = std::result::Result<T, KairosError>;

/// Convert anyhow::Error to KairosError
impl From<anyhow::Error> for KairosError {
    fn from(err: anyhow::Error) -> Self {
        KairosError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KairosError::NotFound("summit".to_string());
        assert_eq!(err.to_string(), "Account not found: summit");
    }

    #[test]
    fn test_classification_error_display() {
        let err = KairosError::Classification("unparsable response".to_string());
        assert!(err.to_string().contains("unparsable response"));
    }
}
