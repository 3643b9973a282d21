//! Quantity criteria against `QuantityIndexEntity`.

use helios_fhir_values::{Decimal, Quantity, ResourceType};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

use super::number::{numeric_clause, parse_decimal};

/// Filters on a quantity search parameter.
///
/// Units and systems are compared verbatim; `mg` and `g` are different units
/// and no UCUM conversion takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// The magnitude compared against.
    pub value: Option<Decimal>,
    /// Unit system; any system when unset.
    pub system: Option<String>,
    /// Unit code or symbol; any unit when unset.
    pub unit: Option<String>,
}

impl QuantityFilter {
    /// Creates a filter on `parameter` without a value.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            prefix: None,
            value: None,
            system: None,
            unit: None,
        }
    }

    /// Sets the comparison prefix.
    pub fn with_prefix(mut self, prefix: SearchPrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Sets the magnitude.
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    /// Restricts matches to a unit system.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Restricts matches to a unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Matches quantities equal to `quantity`, including its system and unit
    /// when present. The UCUM code is preferred over the display unit.
    pub fn of_quantity(parameter: impl Into<String>, quantity: &Quantity) -> Self {
        Self {
            parameter: parameter.into(),
            prefix: None,
            value: Some(quantity.value),
            system: quantity.system.clone(),
            unit: quantity.code.clone().or_else(|| quantity.unit.clone()),
        }
    }

    /// Parses `[prefix]number[|system|unit]` or `[prefix]number|unit`.
    ///
    /// Empty system or unit segments mean "any".
    pub fn parse(parameter: impl Into<String>, raw: &str) -> Result<Self> {
        let parameter = parameter.into();
        let (prefix, rest) = SearchPrefix::extract(raw);
        let parts: Vec<&str> = rest.split('|').collect();

        let (number, system, unit) = match parts.as_slice() {
            [n] => (*n, None, None),
            [n, u] => (*n, None, non_empty(u)),
            [n, s, u] => (*n, non_empty(s), non_empty(u)),
            _ => {
                return Err(SearchError::InvalidValue {
                    parameter,
                    value: raw.to_string(),
                    message: "expected number|system|unit".to_string(),
                });
            }
        };

        Ok(Self {
            value: Some(parse_decimal(&parameter, raw, number)?),
            parameter,
            prefix: Some(prefix),
            system,
            unit,
        })
    }

    /// Compiles the filter for `resource_type`.
    ///
    /// The value comparison comes first, then system, then unit, so the bound
    /// parameters are `[type, name, value.., system?, unit?]`.
    pub fn query(&self, resource_type: &ResourceType, config: &SearchConfig) -> Result<CompiledQuery> {
        let value = self.value.ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;
        let prefix = self.prefix.unwrap_or_default();

        let mut clause = numeric_clause("index_value", prefix, value, &config.approximation);
        if let Some(system) = &self.system {
            clause = clause.and(SqlFragment::with_params(
                "index_system = ?",
                vec![SqlParam::string(system)],
            ));
        }
        if let Some(unit) = &self.unit {
            clause = clause.and(SqlFragment::with_params(
                "index_unit = ?",
                vec![SqlParam::string(unit)],
            ));
        }

        Ok(CompiledQuery::index(IndexKind::Quantity, resource_type, &self.parameter, clause))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
