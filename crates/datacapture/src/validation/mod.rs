//! Answer constraint validation.
//!
//! Each declared constraint kind is checked by one [`ConstraintValidator`].
//! [`QuestionnaireResponseItemValidator`] runs an ordered list of them over a
//! (questionnaire item, response item) pair and aggregates the verdicts:
//!
//! 1. [`RequiredConstraintValidator`]
//! 2. [`MaxValueConstraintValidator`]
//! 3. [`MinValueConstraintValidator`]
//! 4. [`PrimitiveTypeAnswerMaxLengthValidator`]
//! 5. [`PrimitiveTypeAnswerMinLengthValidator`]
//! 6. [`RegexValidator`]
//!
//! Every validator runs even when an earlier one fails, so the caller gets all
//! violations in pipeline order.

mod length;
mod pattern;
mod questionnaire;
mod required;
mod value;

use serde::Serialize;

use crate::error::{Result, ValidationError};
use crate::messages::MessageBundle;
use crate::questionnaire::QuestionnaireItem;
use crate::response::QuestionnaireResponseItem;

pub use length::{PrimitiveTypeAnswerMaxLengthValidator, PrimitiveTypeAnswerMinLengthValidator};
pub use pattern::RegexValidator;
pub use questionnaire::{ItemValidationResult, QuestionnaireResponseValidator, ResponseValidation};
pub use required::RequiredConstraintValidator;
pub use value::{MaxValueConstraintValidator, MinValueConstraintValidator};

/// Checks one kind of constraint.
///
/// Implementations are stateless. A constraint that is not declared on the
/// item, or whose payload is malformed, is not applicable and yields a valid
/// result.
pub trait ConstraintValidator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Validates the answers in `response_item` against `item`.
    ///
    /// Returns `Err` only for data errors, such as an answer whose type cannot
    /// be compared with the constraint.
    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult>;
}

/// Verdict of a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintValidationResult {
    /// Whether the constraint is satisfied.
    pub is_valid: bool,
    /// Failure message. Only present when `is_valid` is false.
    pub message: Option<String>,
}

impl ConstraintValidationResult {
    /// A satisfied (or not applicable) constraint.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    /// A violated constraint.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Aggregate verdict for one response item.
///
/// `is_valid` is authoritative; messages are for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Logical AND of every validator's verdict.
    pub is_valid: bool,
    /// Failure messages in pipeline order.
    pub validation_messages: Vec<String>,
    /// Data errors encountered. Each one also failed its validator.
    #[serde(skip)]
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Joins all messages with newlines, for a single text field.
    ///
    /// Returns an empty string when there are no messages.
    pub fn single_message(&self) -> String {
        self.validation_messages.join("\n")
    }
}

/// Runs the ordered constraint validators over one item.
pub struct QuestionnaireResponseItemValidator {
    validators: Vec<Box<dyn ConstraintValidator>>,
}

impl Default for QuestionnaireResponseItemValidator {
    fn default() -> Self {
        Self {
            validators: vec![
                Box::new(RequiredConstraintValidator),
                Box::new(MaxValueConstraintValidator),
                Box::new(MinValueConstraintValidator),
                Box::new(PrimitiveTypeAnswerMaxLengthValidator),
                Box::new(PrimitiveTypeAnswerMinLengthValidator),
                Box::new(RegexValidator),
            ],
        }
    }
}

impl QuestionnaireResponseItemValidator {
    /// Creates the standard pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validator after the standard ones.
    pub fn with_validator(mut self, validator: Box<dyn ConstraintValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Names of the validators in run order.
    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Validates that `response_item` contains valid answer(s) to `item`.
    pub fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> ValidationResult {
        if item.link_id != response_item.link_id {
            tracing::warn!(
                item = %item.link_id,
                response_item = %response_item.link_id,
                "Validating response item against a questionnaire item with a different linkId"
            );
        }

        let mut result = ValidationResult {
            is_valid: true,
            ..Default::default()
        };

        for validator in &self.validators {
            match validator.validate(item, response_item, bundle) {
                Ok(verdict) => {
                    if !verdict.is_valid {
                        result.is_valid = false;
                        result.validation_messages.extend(verdict.message);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        validator = validator.name(),
                        link_id = %item.link_id,
                        "Answer could not be validated: {}",
                        e
                    );
                    result.is_valid = false;
                    result.validation_messages.push(e.to_string());
                    result.errors.push(e);
                }
            }
        }

        result
    }
}

/// Validates one item with the standard pipeline.
pub fn validate(
    item: &QuestionnaireItem,
    response_item: &QuestionnaireResponseItem,
    bundle: &MessageBundle,
) -> ValidationResult {
    QuestionnaireResponseItemValidator::default().validate(item, response_item, bundle)
}
