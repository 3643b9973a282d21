//! Questionnaire (schema) model.
//!
//! Only the parts of `Questionnaire.item` that govern answer validation are
//! modelled: identity, type, cardinality, `required`, `maxLength` and the
//! constraint extensions.

use std::fmt;
use std::str::FromStr;

use helios_fhir_values::AnswerValue;
use serde::{Deserialize, Serialize};

/// Extension URL for the minimum allowed answer value.
pub const MIN_VALUE_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/minValue";

/// Extension URL for the maximum allowed answer value.
pub const MAX_VALUE_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/maxValue";

/// Extension URL for the minimum answer length.
pub const MIN_LENGTH_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/minLength";

/// Extension URL for the regular expression an answer must match.
pub const REGEX_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/regex";

/// An extension attached to a questionnaire item.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// Identifies the meaning of the extension.
    pub url: String,
    /// The typed `value[x]` payload, if it has one this crate understands.
    pub value: Option<AnswerValue>,
}

impl Extension {
    /// Creates an extension with a typed value.
    pub fn new(url: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
        }
    }
}

/// The kind of answer a questionnaire item collects.
///
/// See: https://hl7.org/fhir/R4/valueset-item-type.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestionnaireItemType {
    Group,
    Display,
    Boolean,
    Decimal,
    Integer,
    Date,
    DateTime,
    Time,
    #[default]
    String,
    Text,
    Url,
    Choice,
    OpenChoice,
    Attachment,
    Reference,
    Quantity,
}

impl QuestionnaireItemType {
    /// Returns true for items that never carry answers of their own.
    pub fn is_non_question(&self) -> bool {
        matches!(
            self,
            QuestionnaireItemType::Group | QuestionnaireItemType::Display
        )
    }
}

impl fmt::Display for QuestionnaireItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            QuestionnaireItemType::Group => "group",
            QuestionnaireItemType::Display => "display",
            QuestionnaireItemType::Boolean => "boolean",
            QuestionnaireItemType::Decimal => "decimal",
            QuestionnaireItemType::Integer => "integer",
            QuestionnaireItemType::Date => "date",
            QuestionnaireItemType::DateTime => "dateTime",
            QuestionnaireItemType::Time => "time",
            QuestionnaireItemType::String => "string",
            QuestionnaireItemType::Text => "text",
            QuestionnaireItemType::Url => "url",
            QuestionnaireItemType::Choice => "choice",
            QuestionnaireItemType::OpenChoice => "open-choice",
            QuestionnaireItemType::Attachment => "attachment",
            QuestionnaireItemType::Reference => "reference",
            QuestionnaireItemType::Quantity => "quantity",
        };
        f.write_str(code)
    }
}

impl FromStr for QuestionnaireItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(QuestionnaireItemType::Group),
            "display" => Ok(QuestionnaireItemType::Display),
            "boolean" => Ok(QuestionnaireItemType::Boolean),
            "decimal" => Ok(QuestionnaireItemType::Decimal),
            "integer" => Ok(QuestionnaireItemType::Integer),
            "date" => Ok(QuestionnaireItemType::Date),
            "dateTime" => Ok(QuestionnaireItemType::DateTime),
            "time" => Ok(QuestionnaireItemType::Time),
            "string" => Ok(QuestionnaireItemType::String),
            "text" => Ok(QuestionnaireItemType::Text),
            "url" => Ok(QuestionnaireItemType::Url),
            "choice" => Ok(QuestionnaireItemType::Choice),
            "open-choice" => Ok(QuestionnaireItemType::OpenChoice),
            "attachment" => Ok(QuestionnaireItemType::Attachment),
            "reference" => Ok(QuestionnaireItemType::Reference),
            "quantity" => Ok(QuestionnaireItemType::Quantity),
            _ => Err(format!("unknown questionnaire item type: {}", s)),
        }
    }
}

/// One node of a questionnaire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionnaireItem {
    /// Unique id of the item within the questionnaire.
    pub link_id: String,
    /// Question text, if any.
    pub text: Option<String>,
    /// The kind of answer collected.
    pub item_type: QuestionnaireItemType,
    /// Whether an answer must be supplied.
    pub required: bool,
    /// Whether the item may have multiple answers.
    pub repeats: bool,
    /// Maximum number of characters in a primitive answer.
    pub max_length: Option<i64>,
    /// Extensions, including constraint extensions.
    pub extensions: Vec<Extension>,
    /// Nested items.
    pub items: Vec<QuestionnaireItem>,
}

impl QuestionnaireItem {
    /// Creates an item of the given type.
    pub fn new(link_id: impl Into<String>, item_type: QuestionnaireItemType) -> Self {
        Self {
            link_id: link_id.into(),
            item_type,
            ..Default::default()
        }
    }

    /// Marks the item as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the item as repeating.
    pub fn repeating(mut self) -> Self {
        self.repeats = true;
        self
    }

    /// Sets `maxLength`.
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Adds an extension.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Adds a nested item.
    pub fn with_item(mut self, item: QuestionnaireItem) -> Self {
        self.items.push(item);
        self
    }

    /// Returns the first extension with the given URL.
    pub fn extension(&self, url: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.url == url)
    }

    /// Returns the typed value of the first extension with the given URL.
    pub fn extension_value(&self, url: &str) -> Option<&AnswerValue> {
        self.extension(url).and_then(|ext| ext.value.as_ref())
    }
}

/// A questionnaire: the schema responses are validated against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Questionnaire {
    /// Canonical URL, if declared.
    pub url: Option<String>,
    /// Top-level items.
    pub items: Vec<QuestionnaireItem>,
}

impl Questionnaire {
    /// Creates a questionnaire from its top-level items.
    pub fn new(items: Vec<QuestionnaireItem>) -> Self {
        Self { url: None, items }
    }

    /// Finds an item anywhere in the tree by linkId.
    pub fn find_item(&self, link_id: &str) -> Option<&QuestionnaireItem> {
        fn find<'a>(items: &'a [QuestionnaireItem], link_id: &str) -> Option<&'a QuestionnaireItem> {
            items.iter().find_map(|item| {
                if item.link_id == link_id {
                    Some(item)
                } else {
                    find(&item.items, link_id)
                }
            })
        }
        find(&self.items, link_id)
    }
}
