//! Per-datatype filter criteria.
//!
//! Each criterion compiles one comparison into a [`CompiledQuery`] against its
//! own index table. [`FilterCriterion`] is the closed set of criteria a
//! [`Search`](crate::Search) combines.

mod date;
mod number;
mod quantity;
mod reference;
mod string;
mod token;

pub use date::DateFilter;
pub use number::NumberFilter;
pub use quantity::QuantityFilter;
pub use reference::ReferenceFilter;
pub use string::{StringFilter, StringMatch};
pub use token::{TokenFilter, TokenValue};

use helios_fhir_values::ResourceType;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind};

/// One filter on one search parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    String(StringFilter),
    Token(TokenFilter),
    Quantity(QuantityFilter),
    Number(NumberFilter),
    Date(DateFilter),
    Reference(ReferenceFilter),
}

impl FilterCriterion {
    /// Parses a raw search value for a parameter of the given kind.
    ///
    /// Number, quantity and date values may carry a leading prefix such as
    /// `ge`. String, token and reference values are taken literally.
    pub fn parse(kind: IndexKind, parameter: impl Into<String>, raw: &str) -> Result<Self> {
        let parameter = parameter.into();
        Ok(match kind {
            IndexKind::String => StringFilter::new(parameter).with_value(raw).into(),
            IndexKind::Token => TokenFilter::parse(parameter, raw)?.into(),
            IndexKind::Quantity => QuantityFilter::parse(parameter, raw)?.into(),
            IndexKind::Number => NumberFilter::parse(parameter, raw)?.into(),
            IndexKind::Date => DateFilter::parse(parameter, raw)?.into(),
            IndexKind::Reference => ReferenceFilter::new(parameter).with_value(raw).into(),
        })
    }

    /// The search parameter name.
    pub fn parameter(&self) -> &str {
        match self {
            FilterCriterion::String(f) => &f.parameter,
            FilterCriterion::Token(f) => &f.parameter,
            FilterCriterion::Quantity(f) => &f.parameter,
            FilterCriterion::Number(f) => &f.parameter,
            FilterCriterion::Date(f) => &f.parameter,
            FilterCriterion::Reference(f) => &f.parameter,
        }
    }

    /// The index table the criterion queries.
    pub fn kind(&self) -> IndexKind {
        match self {
            FilterCriterion::String(_) => IndexKind::String,
            FilterCriterion::Token(_) => IndexKind::Token,
            FilterCriterion::Quantity(_) => IndexKind::Quantity,
            FilterCriterion::Number(_) => IndexKind::Number,
            FilterCriterion::Date(_) => IndexKind::Date,
            FilterCriterion::Reference(_) => IndexKind::Reference,
        }
    }

    /// Compiles the criterion for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType, config: &SearchConfig) -> Result<CompiledQuery> {
        match self {
            FilterCriterion::String(f) => f.query(resource_type),
            FilterCriterion::Token(f) => f.query(resource_type),
            FilterCriterion::Quantity(f) => f.query(resource_type, config),
            FilterCriterion::Number(f) => f.query(resource_type, config),
            FilterCriterion::Date(f) => f.query(resource_type, config),
            FilterCriterion::Reference(f) => f.query(resource_type),
        }
    }
}

impl From<StringFilter> for FilterCriterion {
    fn from(f: StringFilter) -> Self {
        FilterCriterion::String(f)
    }
}

impl From<TokenFilter> for FilterCriterion {
    fn from(f: TokenFilter) -> Self {
        FilterCriterion::Token(f)
    }
}

impl From<QuantityFilter> for FilterCriterion {
    fn from(f: QuantityFilter) -> Self {
        FilterCriterion::Quantity(f)
    }
}

impl From<NumberFilter> for FilterCriterion {
    fn from(f: NumberFilter) -> Self {
        FilterCriterion::Number(f)
    }
}

impl From<DateFilter> for FilterCriterion {
    fn from(f: DateFilter) -> Self {
        FilterCriterion::Date(f)
    }
}

impl From<ReferenceFilter> for FilterCriterion {
    fn from(f: ReferenceFilter) -> Self {
        FilterCriterion::Reference(f)
    }
}

/// Resolves the prefix, defaulting to `eq`, and rejects prefixes the index
/// kind does not support.
fn check_prefix(
    parameter: &str,
    prefix: Option<SearchPrefix>,
    kind: IndexKind,
) -> Result<SearchPrefix> {
    let prefix = prefix.unwrap_or_default();
    if prefix.is_valid_for(kind) {
        Ok(prefix)
    } else {
        Err(SearchError::UnsupportedPrefix {
            parameter: parameter.to_string(),
            prefix,
            kind: kind.name(),
        })
    }
}
