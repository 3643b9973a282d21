//! Complex FHIR datatypes used by answers and search operands.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A measured amount.
///
/// See: https://hl7.org/fhir/R4/datatypes.html#Quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    /// Numerical value, kept at its written precision.
    pub value: Decimal,
    /// Unit representation (e.g., "mg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// System that defines the coded unit form (e.g., "http://unitsofmeasure.org").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Coded form of the unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Quantity {
    /// Creates a quantity with no unit.
    pub fn new(value: Decimal) -> Self {
        Self {
            value,
            unit: None,
            system: None,
            code: None,
        }
    }

    /// Sets the human-readable unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the unit system and code.
    pub fn with_code(mut self, system: impl Into<String>, code: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit.as_ref().or(self.code.as_ref()) {
            Some(unit) => write!(f, "{} {}", self.value, unit),
            None => write!(f, "{}", self.value),
        }
    }
}

/// A reference to a code defined by a terminology system.
///
/// See: https://hl7.org/fhir/R4/datatypes.html#Coding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coding {
    /// Identity of the terminology system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Symbol in syntax defined by the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Representation defined by the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Creates a coding with a system and code.
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: None,
        }
    }

    /// Creates a coding with a code and no system.
    pub fn code_only(code: impl Into<String>) -> Self {
        Self {
            system: None,
            code: Some(code.into()),
            display: None,
        }
    }

    /// Sets the display text.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.system, &self.code) {
            (Some(system), Some(code)) => write!(f, "{}|{}", system, code),
            (None, Some(code)) => f.write_str(code),
            _ => f.write_str(self.display.as_deref().unwrap_or_default()),
        }
    }
}

/// A concept given by zero or more codings plus optional text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    /// Codes defined by terminology systems.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    /// Plain text representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_display() {
        let q = Quantity::new(dec!(5.40)).with_unit("mg");
        assert_eq!(q.to_string(), "5.40 mg");
        assert_eq!(Quantity::new(dec!(7)).to_string(), "7");
    }

    #[test]
    fn test_coding_display() {
        assert_eq!(
            Coding::new("http://loinc.org", "8302-2").to_string(),
            "http://loinc.org|8302-2"
        );
        assert_eq!(Coding::code_only("male").to_string(), "male");
    }
}
