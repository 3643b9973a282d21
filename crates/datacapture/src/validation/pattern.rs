use helios_fhir_values::AnswerValue;
use regex::Regex;

use crate::error::Result;
use crate::messages::{MessageBundle, MessageKey};
use crate::questionnaire::{QuestionnaireItem, REGEX_EXTENSION_URL};
use crate::response::QuestionnaireResponseItem;

use super::{ConstraintValidationResult, ConstraintValidator};

/// Fails when a primitive answer does not fully match the `regex` extension.
///
/// The pattern is anchored at both ends. A pattern that does not compile is
/// treated as not applicable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexValidator;

impl ConstraintValidator for RegexValidator {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn validate(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
    ) -> Result<ConstraintValidationResult> {
        let Some(AnswerValue::String(pattern)) = item.extension_value(REGEX_EXTENSION_URL) else {
            return Ok(ConstraintValidationResult::valid());
        };

        let regex = match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(link_id = %item.link_id, pattern = %pattern, "Ignoring invalid regex: {}", e);
                return Ok(ConstraintValidationResult::valid());
            }
        };

        let mismatch = response_item
            .answers
            .iter()
            .filter_map(AnswerValue::primitive_text)
            .any(|text| !regex.is_match(&text));

        if mismatch {
            return Ok(ConstraintValidationResult::invalid(
                bundle.format(MessageKey::RegexMismatch, &[pattern.as_str()]),
            ));
        }
        Ok(ConstraintValidationResult::valid())
    }
}
