//! Questionnaire response model.

use helios_fhir_values::AnswerValue;

/// The answers submitted for one questionnaire item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionnaireResponseItem {
    /// linkId of the questionnaire item being answered.
    pub link_id: String,
    /// Answers in submission order. Empty when unanswered.
    pub answers: Vec<AnswerValue>,
    /// Nested response items (group children and answer children).
    pub items: Vec<QuestionnaireResponseItem>,
}

impl QuestionnaireResponseItem {
    /// Creates an unanswered response item.
    pub fn new(link_id: impl Into<String>) -> Self {
        Self {
            link_id: link_id.into(),
            ..Default::default()
        }
    }

    /// Adds an answer.
    pub fn with_answer(mut self, answer: impl Into<AnswerValue>) -> Self {
        self.answers.push(answer.into());
        self
    }

    /// Adds a nested item.
    pub fn with_item(mut self, item: QuestionnaireResponseItem) -> Self {
        self.items.push(item);
        self
    }

    /// Returns true if no answer was given.
    pub fn is_unanswered(&self) -> bool {
        self.answers.is_empty()
    }
}

/// A completed (or partially completed) questionnaire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionnaireResponse {
    /// Canonical URL of the questionnaire answered.
    pub questionnaire: Option<String>,
    /// Top-level response items.
    pub items: Vec<QuestionnaireResponseItem>,
}

impl QuestionnaireResponse {
    /// Creates a response from its top-level items.
    pub fn new(items: Vec<QuestionnaireResponseItem>) -> Self {
        Self {
            questionnaire: None,
            items,
        }
    }

    /// Visits every response item in document order, depth first.
    pub fn walk(&self) -> Vec<&QuestionnaireResponseItem> {
        fn collect<'a>(
            items: &'a [QuestionnaireResponseItem],
            out: &mut Vec<&'a QuestionnaireResponseItem>,
        ) {
            for item in items {
                out.push(item);
                collect(&item.items, out);
            }
        }

        let mut out = Vec::new();
        collect(&self.items, &mut out);
        out
    }
}
