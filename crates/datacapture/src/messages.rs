//! Localizable validation messages.
//!
//! Messages are plain templates with positional `{0}`, `{1}`, ... placeholders.
//! A [`MessageBundle`] maps each [`MessageKey`] to a template for one locale;
//! keys a bundle does not define fall back to the English text.
//!
//! # Example
//!
//! ```
//! use helios_datacapture::{MessageBundle, MessageKey};
//!
//! let bundle = MessageBundle::english();
//! assert_eq!(
//!     bundle.format(MessageKey::MinValue, &["10"]),
//!     "Minimum value allowed is:10"
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKey {
    /// A required item has no answer.
    RequiredAnswerMissing,
    /// An answer exceeds the maximum value. `{0}` is the limit.
    MaxValue,
    /// An answer is below the minimum value. `{0}` is the limit.
    MinValue,
    /// An answer is longer than allowed. `{0}` is the limit.
    MaxLength,
    /// An answer is shorter than allowed. `{0}` is the limit.
    MinLength,
    /// An answer does not match the pattern. `{0}` is the pattern.
    RegexMismatch,
}

impl MessageKey {
    /// The English template for this key.
    pub fn default_template(&self) -> &'static str {
        match self {
            MessageKey::RequiredAnswerMissing => "Missing answer for required field.",
            MessageKey::MaxValue => "Maximum value allowed is:{0}",
            MessageKey::MinValue => "Minimum value allowed is:{0}",
            MessageKey::MaxLength => {
                "The maximum number of characters that are permitted in the answer is: {0}"
            }
            MessageKey::MinLength => {
                "The minimum number of characters that are permitted in the answer is: {0}"
            }
            MessageKey::RegexMismatch => "The answer doesn't match regular expression: {0}",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKey::RequiredAnswerMissing => write!(f, "requiredAnswerMissing"),
            MessageKey::MaxValue => write!(f, "maxValue"),
            MessageKey::MinValue => write!(f, "minValue"),
            MessageKey::MaxLength => write!(f, "maxLength"),
            MessageKey::MinLength => write!(f, "minLength"),
            MessageKey::RegexMismatch => write!(f, "regexMismatch"),
        }
    }
}

/// Message templates for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBundle {
    /// BCP-47 language tag (e.g., "en", "pt-BR").
    pub locale: String,
    /// Templates by key. Missing keys use the English default.
    #[serde(default)]
    pub templates: HashMap<MessageKey, String>,
}

impl Default for MessageBundle {
    fn default() -> Self {
        Self::english()
    }
}

impl MessageBundle {
    /// The built-in English bundle.
    pub fn english() -> Self {
        Self {
            locale: "en".to_string(),
            templates: HashMap::new(),
        }
    }

    /// Creates an empty bundle for a locale.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            templates: HashMap::new(),
        }
    }

    /// Overrides the template for a key.
    pub fn with_template(mut self, key: MessageKey, template: impl Into<String>) -> Self {
        self.templates.insert(key, template.into());
        self
    }

    /// Returns the template used for a key.
    pub fn template(&self, key: MessageKey) -> &str {
        self.templates
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    /// Renders a message, substituting `{i}` with `args[i]`.
    pub fn format(&self, key: MessageKey, args: &[&str]) -> String {
        let mut message = self.template(key).to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_defaults() {
        let bundle = MessageBundle::english();
        assert_eq!(
            bundle.format(MessageKey::RequiredAnswerMissing, &[]),
            "Missing answer for required field."
        );
        assert_eq!(
            bundle.format(MessageKey::MaxValue, &["5.5"]),
            "Maximum value allowed is:5.5"
        );
    }

    #[test]
    fn test_override_falls_back_per_key() {
        let bundle = MessageBundle::new("pt-BR")
            .with_template(MessageKey::MinValue, "Valor mínimo permitido: {0}");

        assert_eq!(
            bundle.format(MessageKey::MinValue, &["10"]),
            "Valor mínimo permitido: 10"
        );
        assert_eq!(
            bundle.format(MessageKey::MaxValue, &["10"]),
            "Maximum value allowed is:10"
        );
    }

    #[test]
    fn test_bundle_from_json() {
        let bundle: MessageBundle = serde_json::from_str(
            r#"{"locale": "fr", "templates": {"regexMismatch": "Format invalide : {0}"}}"#,
        )
        .unwrap();

        assert_eq!(bundle.locale, "fr");
        assert_eq!(
            bundle.format(MessageKey::RegexMismatch, &["[0-9]+"]),
            "Format invalide : [0-9]+"
        );
    }

    #[test]
    fn test_placeholder_repeated() {
        let bundle = MessageBundle::new("en").with_template(MessageKey::MaxLength, "{0}/{0}");
        assert_eq!(bundle.format(MessageKey::MaxLength, &["3"]), "3/3");
    }
}
