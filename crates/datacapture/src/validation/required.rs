use crate::error::Result;
use crate::messages::{MessageBundle, MessageKey};
use crate::questionnaire::QuestionnaireItem;
use crate::response::QuestionnaireResponseItem;

use super::{ConstraintValidationResult, ConstraintValidator};

/// Fails when a required item has no answer.
///
/// An item that is not required is always valid. Present answers are accepted
/// whatever their type.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredConstraintValidator;

impl ConstraintValidator for RequiredConstraintValidator {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        if item.required && response_item.is_unanswered() {
            return Ok(ConstraintValidationResult::invalid(
                bundle.format(MessageKey::RequiredAnswerMissing, &[]),
            ));
        }
        Ok(ConstraintValidationResult::valid())
    }
}
