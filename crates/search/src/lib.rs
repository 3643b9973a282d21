//! Helios Search
//!
//! This crate compiles FHIR search filters into parameterized SQL against a
//! fixed set of per-datatype index tables. It generates query text and bound
//! parameters only; executing them is left to the caller's storage layer.
//!
//! # Index tables
//!
//! | Table                  | Value columns                           |
//! |------------------------|-----------------------------------------|
//! | `StringIndexEntity`    | `index_value`                           |
//! | `TokenIndexEntity`     | `index_system`, `index_value`           |
//! | `QuantityIndexEntity`  | `index_system`, `index_unit`, `index_value` |
//! | `NumberIndexEntity`    | `index_value`                           |
//! | `DateIndexEntity`      | `index_from`, `index_to` (epoch ms)     |
//! | `ReferenceIndexEntity` | `index_value`                           |
//!
//! Every table is also keyed by `resourceType`, `index_name` and `resourceId`.
//!
//! # Quick Start
//!
//! ```
//! use helios_fhir_values::ResourceType;
//! use helios_search::{QuantityFilter, SearchConfig, SearchPrefix, SqlParam};
//! use rust_decimal_macros::dec;
//!
//! let observation = ResourceType::parse("Observation").unwrap();
//! let query = QuantityFilter::new("value-quantity")
//!     .with_prefix(SearchPrefix::Eq)
//!     .with_value(dec!(5.403))
//!     .query(&observation, &SearchConfig::default())
//!     .unwrap();
//!
//! assert!(query.condition.starts_with(
//!     "SELECT resourceId FROM QuantityIndexEntity WHERE resourceType = ? AND index_name = ? AND "
//! ));
//! assert_eq!(query.parameters[2], SqlParam::decimal(dec!(5.403)));
//! ```

pub mod config;
pub mod criteria;
pub mod error;
pub mod prefix;
pub mod query;
mod search;

pub use config::{ApproximationPolicy, SearchConfig};
pub use criteria::{
    DateFilter, FilterCriterion, NumberFilter, QuantityFilter, ReferenceFilter, StringFilter,
    StringMatch, TokenFilter, TokenValue,
};
pub use error::{Result, SearchError};
pub use prefix::SearchPrefix;
pub use query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};
pub use search::Search;
