//! Domain error types
//!
//! Errors raised while reading audit log lines back into domain values or
//! validating domain input.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An audit log line could not be parsed
    #[error("Malformed audit line '{line}': {reason}")]
    MalformedAuditLine {
        /// The offending line
        line: String,
        /// Why it was rejected
        reason: String,
    },

    /// A timestamp field was not a whole number of milliseconds
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidTimestamp("abc".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp: abc");

        let err = DomainError::MalformedAuditLine {
            line: "question".to_string(),
            reason: "expected 4 or 7 fields, found 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed audit line 'question': expected 4 or 7 fields, found 1"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::ValidationFailed("x".to_string());
        let err2 = DomainError::ValidationFailed("x".to_string());
        let err3 = DomainError::ValidationFailed("y".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
