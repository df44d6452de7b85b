//! # Error Types — Structured Error Hierarchy
//!
//! Defines the value-level error types shared by every crate in the
//! credential registry. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors name the offending field and the bound it violated.
//! - Cryptographic errors fail loudly with full context.
//! - Higher tiers (entity invariants, lifecycle transitions, operation
//!   rejections) live in the crates that own those concepts and wrap
//!   `CredregError` with `#[from]`.

use thiserror::Error;

/// Top-level value validation error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredregError {
    /// A string field is outside its permitted length range.
    #[error("{field}: length {actual} outside {min}..={max}")]
    InvalidLength {
        /// Field name.
        field: &'static str,
        /// Minimum permitted length.
        min: usize,
        /// Maximum permitted length.
        max: usize,
        /// Observed length.
        actual: usize,
    },

    /// A field does not match its required format.
    #[error("{field}: invalid format {value:?}: {reason}")]
    InvalidFormat {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A value could not be parsed or is otherwise unusable.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Checked arithmetic on an amount overflowed or underflowed.
    #[error("amount arithmetic overflow: {0}")]
    Overflow(String),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_error_display() {
        let err = CredregError::InvalidLength {
            field: "template_id",
            min: 1,
            max: 20,
            actual: 21,
        };
        assert_eq!(err.to_string(), "template_id: length 21 outside 1..=20");
    }

    #[test]
    fn test_format_error_display_quotes_value() {
        let err = CredregError::InvalidFormat {
            field: "currency",
            value: "a b".to_string(),
            reason: "lowercase",
        };
        assert!(err.to_string().contains("\"a b\""));
    }
}
