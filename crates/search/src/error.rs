//! Error types for search compilation.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use helios_fhir_values::ValueError;
use thiserror::Error;

use crate::prefix::SearchPrefix;

/// Errors raised while building or compiling search criteria.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// A criterion was compiled without an operand it requires.
    #[error("search parameter '{parameter}' is missing required field '{field}'")]
    MissingOperand {
        parameter: String,
        field: &'static str,
    },

    /// The prefix cannot be used with this kind of parameter.
    #[error("prefix '{prefix}' is not supported for {kind} parameter '{parameter}'")]
    UnsupportedPrefix {
        parameter: String,
        prefix: SearchPrefix,
        kind: &'static str,
    },

    /// A raw search value could not be parsed.
    #[error("invalid value '{value}' for search parameter '{parameter}': {message}")]
    InvalidValue {
        parameter: String,
        value: String,
        message: String,
    },

    /// A two-letter comparison code is not recognized.
    #[error("unknown search prefix: {prefix}")]
    UnknownPrefix { prefix: String },

    /// The index kind name is not recognized.
    #[error("unknown search parameter kind: {kind}")]
    UnknownKind { kind: String },

    /// A value literal (date, resource type) was invalid.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
