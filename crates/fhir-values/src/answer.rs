//! Typed answer values and the ordering used by value constraints.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::datatypes::{Coding, Quantity};
use crate::error::{Result, ValueError};
use crate::temporal::{FhirDate, FhirDateTime, FhirTime, TimeRange};

/// A single typed value: a questionnaire answer, or a typed constraint payload.
///
/// Absence is never a variant; an unanswered item simply has no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// `valueBoolean`
    Boolean(bool),
    /// `valueInteger`
    Integer(i64),
    /// `valueDecimal`
    Decimal(Decimal),
    /// `valueQuantity`
    Quantity(Quantity),
    /// `valueDate`
    Date(FhirDate),
    /// `valueDateTime`
    DateTime(FhirDateTime),
    /// `valueTime`
    Time(FhirTime),
    /// `valueString`
    String(String),
    /// `valueCoding`
    Coding(Coding),
}

impl AnswerValue {
    /// FHIR datatype name of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            AnswerValue::Boolean(_) => "boolean",
            AnswerValue::Integer(_) => "integer",
            AnswerValue::Decimal(_) => "decimal",
            AnswerValue::Quantity(_) => "Quantity",
            AnswerValue::Date(_) => "date",
            AnswerValue::DateTime(_) => "dateTime",
            AnswerValue::Time(_) => "time",
            AnswerValue::String(_) => "string",
            AnswerValue::Coding(_) => "Coding",
        }
    }

    /// Returns true for FHIR primitive types.
    ///
    /// Quantity and Coding are complex types; every other variant is primitive.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, AnswerValue::Quantity(_) | AnswerValue::Coding(_))
    }

    /// Renders a primitive value as its FHIR string form.
    ///
    /// Returns `None` for complex types.
    pub fn primitive_text(&self) -> Option<String> {
        match self {
            AnswerValue::Boolean(b) => Some(b.to_string()),
            AnswerValue::Integer(i) => Some(i.to_string()),
            AnswerValue::Decimal(d) => Some(d.to_string()),
            AnswerValue::Date(d) => Some(d.as_str().to_string()),
            AnswerValue::DateTime(dt) => Some(dt.as_str().to_string()),
            AnswerValue::Time(t) => Some(t.as_str().to_string()),
            AnswerValue::String(s) => Some(s.clone()),
            AnswerValue::Quantity(_) | AnswerValue::Coding(_) => None,
        }
    }

    /// Numeric magnitude of integer, decimal and quantity values.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AnswerValue::Integer(i) => Some(Decimal::from(*i)),
            AnswerValue::Decimal(d) => Some(*d),
            AnswerValue::Quantity(q) => Some(q.value),
            _ => None,
        }
    }

    /// Instant range of date and dateTime values.
    pub fn as_time_range(&self) -> Option<TimeRange> {
        match self {
            AnswerValue::Date(d) => Some(d.range()),
            AnswerValue::DateTime(dt) => Some(dt.range()),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Quantity(q) => write!(f, "{}", q),
            AnswerValue::Coding(c) => write!(f, "{}", c),
            other => f.write_str(&other.primitive_text().unwrap_or_default()),
        }
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Integer(value)
    }
}

impl From<Decimal> for AnswerValue {
    fn from(value: Decimal) -> Self {
        AnswerValue::Decimal(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::String(value.to_string())
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Boolean(value)
    }
}

/// Compares `value` against `threshold`.
///
/// - integer, decimal and quantity values compare numerically by magnitude
///   without floating-point conversion.
/// - date and dateTime values compare by the interval they cover. A value
///   overlapping the threshold's interval is `Equal`, so `2024-06-15` neither
///   exceeds nor falls short of the year `2024`.
/// - time values compare as times of day.
///
/// Any other pairing is a [`ValueError::TypeMismatch`]; values are never
/// coerced (a string `"9"` does not compare with an integer threshold).
pub fn compare_values(value: &AnswerValue, threshold: &AnswerValue) -> Result<Ordering> {
    if let (Some(lhs), Some(rhs)) = (value.as_decimal(), threshold.as_decimal()) {
        return Ok(lhs.cmp(&rhs));
    }

    if let (Some(lhs), Some(rhs)) = (value.as_time_range(), threshold.as_time_range()) {
        return Ok(lhs.compare_position(&rhs));
    }

    if let (AnswerValue::Time(lhs), AnswerValue::Time(rhs)) = (value, threshold) {
        return Ok(lhs.time().cmp(&rhs.time()));
    }

    Err(ValueError::TypeMismatch {
        expected: threshold.type_name(),
        found: value.type_name(),
    })
}

/// Returns true if `threshold` is a type [`compare_values`] can order against.
pub fn is_ordered_type(threshold: &AnswerValue) -> bool {
    matches!(
        threshold,
        AnswerValue::Integer(_)
            | AnswerValue::Decimal(_)
            | AnswerValue::Quantity(_)
            | AnswerValue::Date(_)
            | AnswerValue::DateTime(_)
            | AnswerValue::Time(_)
    )
}
