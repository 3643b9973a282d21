//! Helios Data Capture
//!
//! This crate validates `QuestionnaireResponse` answers against the
//! constraints declared on the matching `Questionnaire` items.
//!
//! # Constraints
//!
//! - `required` - the item must have at least one answer
//! - `maxValue` / `minValue` extensions - numeric, date, dateTime and time bounds
//! - `maxLength` / `minLength` extension - character limits for primitive answers
//! - `regex` extension - primitive answers must fully match the pattern
//!
//! # Architecture
//!
//! - [`questionnaire`] - the schema model
//! - [`response`] - the answer model
//! - [`validation`] - constraint validators and the per-item pipeline
//! - [`messages`] - localizable message templates
//! - [`error`] - data errors
//!
//! JSON resources are loaded with [`Questionnaire::from_json`] and
//! [`QuestionnaireResponse::from_json`].
//!
//! # Quick Start
//!
//! ```
//! use helios_datacapture::questionnaire::{
//!     Extension, QuestionnaireItem, QuestionnaireItemType, MIN_VALUE_EXTENSION_URL,
//! };
//! use helios_datacapture::response::QuestionnaireResponseItem;
//! use helios_datacapture::validation::validate;
//! use helios_datacapture::MessageBundle;
//! use helios_fhir_values::AnswerValue;
//!
//! let item = QuestionnaireItem::new("age", QuestionnaireItemType::Integer)
//!     .with_extension(Extension::new(MIN_VALUE_EXTENSION_URL, AnswerValue::Integer(10)));
//! let answer = QuestionnaireResponseItem::new("age").with_answer(9i64);
//!
//! let result = validate(&item, &answer, &MessageBundle::english());
//! assert!(!result.is_valid);
//! assert_eq!(result.validation_messages, vec!["Minimum value allowed is:10"]);
//! ```

pub mod error;
mod json;
pub mod messages;
pub mod questionnaire;
pub mod response;
pub mod validation;

pub use error::{Result, ValidationError};
pub use messages::{MessageBundle, MessageKey};
pub use questionnaire::{Questionnaire, QuestionnaireItem, QuestionnaireItemType};
pub use response::{QuestionnaireResponse, QuestionnaireResponseItem};
pub use validation::{
    ConstraintValidationResult, ConstraintValidator, QuestionnaireResponseItemValidator,
    QuestionnaireResponseValidator, ResponseValidation, ValidationResult,
};
