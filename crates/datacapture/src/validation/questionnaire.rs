use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, ValidationError};
use crate::messages::MessageBundle;
use crate::questionnaire::{Questionnaire, QuestionnaireItem};
use crate::response::{QuestionnaireResponse, QuestionnaireResponseItem};

use super::{QuestionnaireResponseItemValidator, ValidationResult};

/// The verdict for one answered (or unanswered) question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemValidationResult {
    /// linkId of the questionnaire item.
    pub link_id: String,
    /// Pipeline verdict for the item's answers.
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Per-item verdicts for a whole response, in questionnaire order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResponseValidation {
    /// One entry per validated response item.
    pub items: Vec<ItemValidationResult>,
}

impl ResponseValidation {
    /// True when every item is valid.
    pub fn is_valid(&self) -> bool {
        self.items.iter().all(|i| i.result.is_valid)
    }

    /// Items that failed at least one constraint.
    pub fn invalid_items(&self) -> impl Iterator<Item = &ItemValidationResult> {
        self.items.iter().filter(|i| !i.result.is_valid)
    }

    /// Verdict for a linkId. Returns the first occurrence for repeated groups.
    pub fn get(&self, link_id: &str) -> Option<&ValidationResult> {
        self.items
            .iter()
            .find(|i| i.link_id == link_id)
            .map(|i| &i.result)
    }
}

/// Validates a whole response against its questionnaire.
///
/// Response items are paired with questionnaire items by linkId anywhere in
/// the tree. Group and display items are not validated themselves but their
/// children are. A question with no response item is validated as unanswered.
#[derive(Default)]
pub struct QuestionnaireResponseValidator {
    item_validator: QuestionnaireResponseItemValidator,
}

impl QuestionnaireResponseValidator {
    /// Creates a validator that runs `item_validator` on every question.
    pub fn new(item_validator: QuestionnaireResponseItemValidator) -> Self {
        Self { item_validator }
    }

    /// Validates every question of `questionnaire`.
    ///
    /// Fails with [`ValidationError::UnknownLinkId`] when the response holds an
    /// item the questionnaire does not declare, and with
    /// [`ValidationError::TooManyAnswers`] when a non-repeating item has more
    /// than one answer.
    pub fn validate(
        &self,
        questionnaire: &Questionnaire,
        response: &QuestionnaireResponse,
        bundle: &MessageBundle,
    ) -> Result<ResponseValidation> {
        let mut by_link_id: HashMap<&str, Vec<&QuestionnaireResponseItem>> = HashMap::new();
        for item in response.walk() {
            if questionnaire.find_item(&item.link_id).is_none() {
                return Err(ValidationError::UnknownLinkId {
                    link_id: item.link_id.clone(),
                });
            }
            by_link_id.entry(item.link_id.as_str()).or_default().push(item);
        }

        let mut validation = ResponseValidation::default();
        self.validate_items(&questionnaire.items, &by_link_id, bundle, &mut validation)?;

        tracing::debug!(
            items = validation.items.len(),
            invalid = validation.invalid_items().count(),
            "Validated questionnaire response"
        );
        Ok(validation)
    }

    fn validate_items(
        &self,
        items: &[QuestionnaireItem],
        by_link_id: &HashMap<&str, Vec<&QuestionnaireResponseItem>>,
        bundle: &MessageBundle,
        out: &mut ResponseValidation,
    ) -> Result<()> {
        for item in items {
            if !item.item_type.is_non_question() {
                let occurrences = by_link_id
                    .get(item.link_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                if occurrences.is_empty() {
                    let unanswered = QuestionnaireResponseItem::new(item.link_id.clone());
                    self.push_result(item, &unanswered, bundle, out);
                }
                for response_item in occurrences {
                    if !item.repeats && response_item.answers.len() > 1 {
                        return Err(ValidationError::TooManyAnswers {
                            link_id: item.link_id.clone(),
                            count: response_item.answers.len(),
                        });
                    }
                    self.push_result(item, response_item, bundle, out);
                }
            }

            self.validate_items(&item.items, by_link_id, bundle, out)?;
        }
        Ok(())
    }

    fn push_result(
        &self,
        item: &QuestionnaireItem,
        response_item: &QuestionnaireResponseItem,
        bundle: &MessageBundle,
        out: &mut ResponseValidation,
    ) {
        out.items.push(ItemValidationResult {
            link_id: item.link_id.clone(),
            result: self.item_validator.validate(item, response_item, bundle),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{Extension, MAX_VALUE_EXTENSION_URL, QuestionnaireItemType};
    use helios_fhir_values::AnswerValue;

    fn questionnaire() -> Questionnaire {
        Questionnaire::new(vec![
            QuestionnaireItem::new("intro", QuestionnaireItemType::Display),
            QuestionnaireItem::new("patient", QuestionnaireItemType::Group)
                .with_item(QuestionnaireItem::new("name", QuestionnaireItemType::String).required())
                .with_item(
                    QuestionnaireItem::new("age", QuestionnaireItemType::Integer).with_extension(
                        Extension::new(MAX_VALUE_EXTENSION_URL, AnswerValue::Integer(130)),
                    ),
                ),
            QuestionnaireItem::new("allergies", QuestionnaireItemType::String).repeating(),
        ])
    }

    #[test]
    fn test_results_in_questionnaire_order_skipping_groups() {
        let response = QuestionnaireResponse::new(vec![
            QuestionnaireResponseItem::new("allergies").with_answer("nuts"),
            QuestionnaireResponseItem::new("patient")
                .with_item(QuestionnaireResponseItem::new("age").with_answer(140i64)),
        ]);

        let validation = QuestionnaireResponseValidator::default()
            .validate(&questionnaire(), &response, &MessageBundle::english())
            .unwrap();

        let ids: Vec<&str> = validation.items.iter().map(|i| i.link_id.as_str()).collect();
        assert_eq!(ids, vec!["name", "age", "allergies"]);
        assert!(!validation.is_valid());
        assert_eq!(
            validation.get("name").unwrap().validation_messages,
            vec!["Missing answer for required field."]
        );
        assert_eq!(
            validation.get("age").unwrap().validation_messages,
            vec!["Maximum value allowed is:130"]
        );
        assert!(validation.get("allergies").unwrap().is_valid);
        assert_eq!(validation.invalid_items().count(), 2);
    }

    #[test]
    fn test_unknown_link_id() {
        let response =
            QuestionnaireResponse::new(vec![QuestionnaireResponseItem::new("shoe-size").with_answer(9i64)]);

        let err = QuestionnaireResponseValidator::default()
            .validate(&questionnaire(), &response, &MessageBundle::english())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownLinkId {
                link_id: "shoe-size".to_string()
            }
        );
    }

    #[test]
    fn test_too_many_answers_for_non_repeating_item() {
        let response = QuestionnaireResponse::new(vec![QuestionnaireResponseItem::new("patient")
            .with_item(
                QuestionnaireResponseItem::new("name")
                    .with_answer("Ada")
                    .with_answer("Grace"),
            )]);

        let err = QuestionnaireResponseValidator::default()
            .validate(&questionnaire(), &response, &MessageBundle::english())
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooManyAnswers { count: 2, .. }));
    }

    #[test]
    fn test_repeating_item_accepts_many_answers() {
        let response = QuestionnaireResponse::new(vec![
            QuestionnaireResponseItem::new("patient")
                .with_item(QuestionnaireResponseItem::new("name").with_answer("Ada")),
            QuestionnaireResponseItem::new("allergies")
                .with_answer("nuts")
                .with_answer("pollen"),
        ]);

        let validation = QuestionnaireResponseValidator::default()
            .validate(&questionnaire(), &response, &MessageBundle::english())
            .unwrap();
        assert!(validation.is_valid());
    }

    #[test]
    fn test_serializes_as_array() {
        let response = QuestionnaireResponse::new(vec![QuestionnaireResponseItem::new("patient")
            .with_item(QuestionnaireResponseItem::new("name").with_answer("Ada"))]);

        let validation = QuestionnaireResponseValidator::default()
            .validate(&questionnaire(), &response, &MessageBundle::english())
            .unwrap();
        let json = serde_json::to_value(&validation).unwrap();

        assert_eq!(
            json[0],
            serde_json::json!({"linkId": "name", "isValid": true, "validationMessages": []})
        );
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}
