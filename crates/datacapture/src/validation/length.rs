use helios_fhir_values::AnswerValue;

use crate::error::Result;
use crate::messages::{MessageBundle, MessageKey};
use crate::questionnaire::{MIN_LENGTH_EXTENSION_URL, QuestionnaireItem};
use crate::response::QuestionnaireResponseItem;

use super::{ConstraintValidationResult, ConstraintValidator};

/// Fails when a primitive answer has more characters than `item.maxLength`.
///
/// Quantity and Coding answers are not length checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveTypeAnswerMaxLengthValidator;

/// Fails when a primitive answer has fewer characters than the `minLength`
/// extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveTypeAnswerMinLengthValidator;

impl ConstraintValidator for PrimitiveTypeAnswerMaxLengthValidator {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        let Some(limit) = item.max_length.and_then(|l| usize_limit(item, l)) else {
            return Ok(ConstraintValidationResult::valid());
        };

        if primitive_lengths(response_item).any(|len| len > limit) {
            return Ok(ConstraintValidationResult::invalid(
                bundle.format(MessageKey::MaxLength, &[&limit.to_string()]),
            ));
        }
        Ok(ConstraintValidationResult::valid())
    }
}

impl ConstraintValidator for PrimitiveTypeAnswerMinLengthValidator {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        let limit = match item.extension_value(MIN_LENGTH_EXTENSION_URL) {
            Some(AnswerValue::Integer(l)) => usize_limit(item, *l),
            Some(other) => {
                tracing::debug!(
                    link_id = %item.link_id,
                    payload_type = other.type_name(),
                    "Ignoring minLength extension without an integer value"
                );
                None
            }
            None => None,
        };
        let Some(limit) = limit else {
            return Ok(ConstraintValidationResult::valid());
        };

        if primitive_lengths(response_item).any(|len| len < limit) {
            return Ok(ConstraintValidationResult::invalid(
                bundle.format(MessageKey::MinLength, &[&limit.to_string()]),
            ));
        }
        Ok(ConstraintValidationResult::valid())
    }
}

fn usize_limit(item: &QuestionnaireItem, limit: i64) -> Option<usize> {
    match usize::try_from(limit) {
        Ok(l) => Some(l),
        Err(_) => {
            tracing::debug!(link_id = %item.link_id, limit, "Ignoring negative length limit");
            None
        }
    }
}

/// Character counts of the primitive answers, in Unicode scalar values.
fn primitive_lengths(response_item: &QuestionnaireResponseItem) -> impl Iterator<Item = usize> + '_ {
    response_item
        .answers
        .iter()
        .filter_map(AnswerValue::primitive_text)
        .map(|text| text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{Extension, QuestionnaireItemType};
    use helios_fhir_values::{Coding, Quantity};
    use rust_decimal_macros::dec;

    fn min_length_item(limit: i64) -> QuestionnaireItem {
        QuestionnaireItem::new("q", QuestionnaireItemType::String).with_extension(Extension::new(
            MIN_LENGTH_EXTENSION_URL,
            AnswerValue::Integer(limit),
        ))
    }

    #[test]
    fn test_max_length_violation() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::String).with_max_length(5);
        let response = QuestionnaireResponseItem::new("q").with_answer("abcdef");

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.message.as_deref(),
            Some("The maximum number of characters that are permitted in the answer is: 5")
        );
    }

    #[test]
    fn test_max_length_at_limit() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::String).with_max_length(5);
        let response = QuestionnaireResponseItem::new("q").with_answer("abcde");

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::String).with_max_length(4);
        let response = QuestionnaireResponseItem::new("q").with_answer("ação");

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_max_length_applies_to_integer_text() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::Integer).with_max_length(3);
        let response = QuestionnaireResponseItem::new("q").with_answer(12345i64);

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(!result.is_valid);
    }

    #[test]
    fn test_complex_answers_are_not_length_checked() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::Choice).with_max_length(1);
        let response = QuestionnaireResponseItem::new("q")
            .with_answer(AnswerValue::Coding(Coding::new("http://loinc.org", "8480-6")))
            .with_answer(AnswerValue::Quantity(Quantity::new(dec!(120)).with_unit("mmHg")));

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_min_length_violation() {
        let response = QuestionnaireResponseItem::new("q").with_answer("ab");

        let result = PrimitiveTypeAnswerMinLengthValidator
            .validate(&min_length_item(3), &response, &MessageBundle::english())
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.message.as_deref(),
            Some("The minimum number of characters that are permitted in the answer is: 3")
        );
    }

    #[test]
    fn test_min_length_unanswered_is_valid() {
        let response = QuestionnaireResponseItem::new("q");

        let result = PrimitiveTypeAnswerMinLengthValidator
            .validate(&min_length_item(3), &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_min_length_malformed_payload_is_ignored() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::String)
            .with_extension(Extension::new(MIN_LENGTH_EXTENSION_URL, AnswerValue::from("3")));
        let response = QuestionnaireResponseItem::new("q").with_answer("a");

        let result = PrimitiveTypeAnswerMinLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_negative_limit_is_ignored() {
        let item = QuestionnaireItem::new("q", QuestionnaireItemType::String).with_max_length(-1);
        let response = QuestionnaireResponseItem::new("q").with_answer("abc");

        let result = PrimitiveTypeAnswerMaxLengthValidator
            .validate(&item, &response, &MessageBundle::english())
            .unwrap();
        assert!(result.is_valid);
    }
}
