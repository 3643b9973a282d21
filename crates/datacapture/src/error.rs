//! Error types for questionnaire validation.
//!
//! Constraint violations are not errors; they are reported through
//! [`ValidationResult`](crate::validation::ValidationResult). The errors here
//! cover data that cannot be checked at all: answers whose type cannot be
//! compared with a constraint, responses that do not fit the questionnaire
//! structure, and malformed JSON input.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use helios_fhir_values::ValueError;
use thiserror::Error;

/// Errors raised while validating questionnaire responses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An answer's type cannot be compared with the declared constraint.
    #[error("answer to '{link_id}' has an incompatible type: {source}")]
    AnswerType {
        link_id: String,
        #[source]
        source: ValueError,
    },

    /// The response contains an item the questionnaire does not declare.
    #[error("response item '{link_id}' does not match any questionnaire item")]
    UnknownLinkId { link_id: String },

    /// A non-repeating item received more than one answer.
    #[error("item '{link_id}' does not repeat but has {count} answers")]
    TooManyAnswers { link_id: String, count: usize },

    /// A required JSON field is missing.
    #[error("missing required field '{field}' at {path}")]
    MissingField { path: String, field: String },

    /// JSON input does not have the expected shape.
    #[error("invalid JSON at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// A literal inside the JSON input could not be parsed.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
