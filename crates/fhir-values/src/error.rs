//! Error types for value parsing and comparison.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// Errors raised while parsing or comparing FHIR values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A date, dateTime or time literal could not be parsed.
    #[error("invalid {kind} value: {value}")]
    InvalidTemporal { kind: &'static str, value: String },

    /// A decimal literal could not be parsed.
    #[error("invalid decimal value: {value}")]
    InvalidDecimal { value: String },

    /// A resource type name is not a valid FHIR resource type identifier.
    #[error("invalid resource type: {value}")]
    InvalidResourceType { value: String },

    /// Two values of incompatible types were compared.
    #[error("cannot compare {found} answer with {expected} value")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type for value operations.
pub type Result<T> = std::result::Result<T, ValueError>;
