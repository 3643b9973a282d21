//! FHIR resource type names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};

/// The name of a FHIR resource type (e.g., `Observation`, `Patient`).
///
/// Resource types scope every index table row, so they are validated once on
/// construction and then passed around by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceType(String);

impl ResourceType {
    /// Parses a resource type name.
    ///
    /// Namespace prefixes in curly brackets are removed first, so
    /// `{http://hl7.org/fhir}Patient` parses as `Patient`. Some serializers
    /// emit qualified names of that form.
    pub fn parse(value: &str) -> Result<Self> {
        let name = strip_namespaces(value);
        let name = name.trim();

        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric()),
            None => false,
        };

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(ValueError::InvalidResourceType {
                value: value.to_string(),
            })
        }
    }

    /// Returns the resource type name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Removes every `{...}` group from a qualified name.
fn strip_namespaces(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceType {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        value.0
    }
}

impl AsRef<str> for ResourceType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let rt = ResourceType::parse("Observation").unwrap();
        assert_eq!(rt.name(), "Observation");
        assert_eq!(rt.to_string(), "Observation");
    }

    #[test]
    fn test_parse_strips_namespace() {
        let rt = ResourceType::parse("{http://hl7.org/fhir}Patient").unwrap();
        assert_eq!(rt.name(), "Patient");
    }

    #[test]
    fn test_parse_rejects_lowercase() {
        assert!(matches!(
            ResourceType::parse("patient"),
            Err(ValueError::InvalidResourceType { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_symbols() {
        assert!(ResourceType::parse("").is_err());
        assert!(ResourceType::parse("{ns}").is_err());
        assert!(ResourceType::parse("Patient/123").is_err());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let rt: ResourceType = serde_json::from_str("\"Encounter\"").unwrap();
        assert_eq!(rt.name(), "Encounter");
        assert!(serde_json::from_str::<ResourceType>("\"bad type\"").is_err());
    }
}
