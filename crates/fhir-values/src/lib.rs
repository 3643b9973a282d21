//! Helios FHIR Values
//!
//! The subset of the FHIR datatype system needed to check answer constraints
//! and to compile search filters: resource type names, integers and exact
//! decimals, quantities, partial-precision dates, times, strings and codings.
//!
//! # Modules
//!
//! - [`resource_type`] - Validated resource type names
//! - [`temporal`] - `date`, `dateTime` and `time` with precision tracking
//! - [`datatypes`] - `Quantity`, `Coding`, `CodeableConcept`
//! - [`answer`] - The [`AnswerValue`] union and [`compare_values`]
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use std::cmp::Ordering;
//! use helios_fhir_values::{AnswerValue, FhirDate, compare_values};
//!
//! let limit = AnswerValue::Date(FhirDate::parse("2024").unwrap());
//! let inside = AnswerValue::Date(FhirDate::parse("2024-03-15").unwrap());
//! let after = AnswerValue::Date(FhirDate::parse("2025-01-01").unwrap());
//! assert_eq!(compare_values(&inside, &limit).unwrap(), Ordering::Equal);
//! assert_eq!(compare_values(&after, &limit).unwrap(), Ordering::Greater);
//! ```

pub mod answer;
pub mod datatypes;
pub mod error;
pub mod resource_type;
pub mod temporal;

pub use answer::{AnswerValue, compare_values, is_ordered_type};
pub use datatypes::{CodeableConcept, Coding, Quantity};
pub use error::{Result, ValueError};
pub use resource_type::ResourceType;
pub use temporal::{DatePrecision, FhirDate, FhirDateTime, FhirTime, TimeRange};

pub use rust_decimal::Decimal;
