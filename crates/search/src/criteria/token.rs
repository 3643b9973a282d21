//! Token criteria against `TokenIndexEntity`.

use helios_fhir_values::{CodeableConcept, Coding, ResourceType};

use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

use super::check_prefix;

/// One `system|code` pair. A missing system matches any system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValue {
    /// Code system URI.
    pub system: Option<String>,
    /// The code.
    pub code: String,
}

impl TokenValue {
    /// A code in any system.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            system: None,
            code: code.into(),
        }
    }

    /// A code in a specific system.
    pub fn system_code(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: code.into(),
        }
    }

    /// Converts a coding. Returns `None` when it has no code.
    pub fn from_coding(coding: &Coding) -> Option<Self> {
        coding.code.as_ref().map(|code| Self {
            system: coding.system.clone(),
            code: code.clone(),
        })
    }

    fn clause(&self) -> SqlFragment {
        match &self.system {
            Some(system) => SqlFragment::with_params(
                "index_system = ? AND index_value = ?",
                vec![SqlParam::string(system), SqlParam::string(&self.code)],
            ),
            None => SqlFragment::with_params("index_value = ?", vec![SqlParam::string(&self.code)]),
        }
    }
}

/// Filters on a token (coded value) search parameter.
///
/// Several values are alternatives; a resource matches if any one matches.
/// Only `eq` and `ne` are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// Alternatives, ORed together.
    pub values: Vec<TokenValue>,
}

impl TokenFilter {
    /// Creates a filter on `parameter` without a value.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            prefix: None,
            values: Vec::new(),
        }
    }

    /// Sets the comparison prefix.
    pub fn with_prefix(mut self, prefix: SearchPrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Adds an alternative value.
    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.values.push(value);
        self
    }

    /// Matches a code in any system.
    pub fn of_code(parameter: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(parameter).with_value(TokenValue::code(code))
    }

    /// Matches a single coding.
    pub fn of_coding(parameter: impl Into<String>, coding: &Coding) -> Self {
        let mut filter = Self::new(parameter);
        filter.values.extend(TokenValue::from_coding(coding));
        filter
    }

    /// Matches any coding of a concept.
    pub fn of_concept(parameter: impl Into<String>, concept: &CodeableConcept) -> Self {
        let mut filter = Self::new(parameter);
        filter
            .values
            .extend(concept.coding.iter().filter_map(TokenValue::from_coding));
        filter
    }

    /// Matches a boolean, indexed as the code `true` or `false`.
    pub fn of_boolean(parameter: impl Into<String>, value: bool) -> Self {
        Self::of_code(parameter, value.to_string())
    }

    /// Parses `[system|]code`. An empty system before `|` means any system.
    pub fn parse(parameter: impl Into<String>, raw: &str) -> Result<Self> {
        let parameter = parameter.into();
        let value = match raw.split_once('|') {
            Some((system, code)) if !system.is_empty() => TokenValue::system_code(system, code),
            Some((_, code)) => TokenValue::code(code),
            None => TokenValue::code(raw),
        };
        if value.code.is_empty() {
            return Err(SearchError::InvalidValue {
                parameter,
                value: raw.to_string(),
                message: "token code cannot be empty".to_string(),
            });
        }
        Ok(Self::new(parameter).with_value(value))
    }

    /// Compiles the filter for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType) -> Result<CompiledQuery> {
        let prefix = check_prefix(&self.parameter, self.prefix, IndexKind::Token)?;
        let mut values = self.values.iter();
        let first = values.next().ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;

        let clause = values.fold(first.clause(), |acc, v| acc.or(v.clause()));
        let clause = if prefix == SearchPrefix::Ne {
            clause.negate()
        } else {
            clause
        };

        Ok(CompiledQuery::index(IndexKind::Token, resource_type, &self.parameter, clause))
    }
}
