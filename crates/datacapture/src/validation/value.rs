use std::cmp::Ordering;

use helios_fhir_values::{compare_values, is_ordered_type};

use crate::error::{Result, ValidationError};
use crate::messages::{MessageBundle, MessageKey};
use crate::questionnaire::{MAX_VALUE_EXTENSION_URL, MIN_VALUE_EXTENSION_URL, QuestionnaireItem};
use crate::response::QuestionnaireResponseItem;

use super::{ConstraintValidationResult, ConstraintValidator};

/// Fails when an answer is greater than the `maxValue` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxValueConstraintValidator;

/// Fails when an answer is less than the `minValue` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinValueConstraintValidator;

impl ConstraintValidator for MaxValueConstraintValidator {
    fn name(&self) -> &'static str {
        "maxValue"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        check_threshold(
            item,
            response_item,
            bundle,
            MAX_VALUE_EXTENSION_URL,
            Ordering::Greater,
            MessageKey::MaxValue,
        )
    }
}

impl ConstraintValidator for MinValueConstraintValidator {
    fn name(&self) -> &'static str {
        "minValue"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        check_threshold(
            item,
            response_item,
            bundle,
            MIN_VALUE_EXTENSION_URL,
            Ordering::Less,
            MessageKey::MinValue,
        )
    }
}

/// Fails on the first answer whose comparison with the threshold equals
/// `violation`. Equality with the threshold always passes.
fn check_threshold(
    item: &QuestionnaireItem,
    response_item: &QuestionnaireResponseItem,
    bundle: &MessageBundle,
    url: &str,
    violation: Ordering,
    key: MessageKey,
) -> Result<ConstraintValidationResult> {
    let Some(threshold) = item.extension_value(url) else {
        return Ok(ConstraintValidationResult::valid());
    };

    if !is_ordered_type(threshold) {
        tracing::debug!(
            link_id = %item.link_id,
            url,
            threshold_type = threshold.type_name(),
            "Ignoring value constraint with unordered payload"
        );
        return Ok(ConstraintValidationResult::valid());
    }

    for answer in &response_item.answers {
        let ordering =
            compare_values(answer, threshold).map_err(|source| ValidationError::AnswerType {
                link_id: item.link_id.clone(),
                source,
            })?;

        if ordering == violation {
            let limit = threshold.to_string();
            return Ok(ConstraintValidationResult::invalid(
                bundle.format(key, &[&limit]),
            ));
        }
    }

    Ok(ConstraintValidationResult::valid())
}
