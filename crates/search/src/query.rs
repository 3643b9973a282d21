//! Compiled queries against the per-datatype index tables.
//!
//! Every criterion compiles to a query of the shape
//!
//! ```text
//! SELECT resourceId FROM <IndexTable> WHERE resourceType = ? AND index_name = ? AND <clause>
//! ```
//!
//! with parameters `[resourceType, parameterName, ..clause operands]`.
//! Placeholders are positional `?` markers, so fragments compose by plain
//! concatenation of their SQL and parameter lists.

use std::fmt;
use std::str::FromStr;

use helios_fhir_values::{Decimal, ResourceType};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// The datatype of an index table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// `StringIndexEntity(index_value)`
    String,
    /// `TokenIndexEntity(index_system, index_value)`
    Token,
    /// `QuantityIndexEntity(index_system, index_unit, index_value)`
    Quantity,
    /// `NumberIndexEntity(index_value)`
    Number,
    /// `DateIndexEntity(index_from, index_to)` as epoch milliseconds, both inclusive.
    Date,
    /// `ReferenceIndexEntity(index_value)`
    Reference,
}

impl IndexKind {
    /// Name of the index table.
    pub fn table(&self) -> &'static str {
        match self {
            IndexKind::String => "StringIndexEntity",
            IndexKind::Token => "TokenIndexEntity",
            IndexKind::Quantity => "QuantityIndexEntity",
            IndexKind::Number => "NumberIndexEntity",
            IndexKind::Date => "DateIndexEntity",
            IndexKind::Reference => "ReferenceIndexEntity",
        }
    }

    /// Lowercase name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::String => "string",
            IndexKind::Token => "token",
            IndexKind::Quantity => "quantity",
            IndexKind::Number => "number",
            IndexKind::Date => "date",
            IndexKind::Reference => "reference",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(IndexKind::String),
            "token" => Ok(IndexKind::Token),
            "quantity" => Ok(IndexKind::Quantity),
            "number" => Ok(IndexKind::Number),
            "date" => Ok(IndexKind::Date),
            "reference" => Ok(IndexKind::Reference),
            _ => Err(SearchError::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Exact decimal parameter.
    Decimal(Decimal),
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a decimal parameter.
    pub fn decimal(d: Decimal) -> Self {
        SqlParam::Decimal(d)
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::String(s) => write!(f, "'{}'", s),
            SqlParam::Integer(i) => write!(f, "{}", i),
            SqlParam::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Combines with another fragment using AND.
    pub fn and(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("{} AND {}", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Combines with another fragment using OR.
    ///
    /// The result is parenthesized so it can be ANDed safely.
    pub fn or(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({} OR {})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Wraps the fragment in `NOT (...)`.
    pub fn negate(mut self) -> Self {
        self.sql = format!("NOT ({})", self.sql);
        self
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A complete query: condition text with `?` placeholders and the values to
/// bind, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    /// SQL text.
    pub condition: String,
    /// Bound parameters, one per placeholder.
    pub parameters: Vec<SqlParam>,
}

impl CompiledQuery {
    /// Scopes a comparison clause to an index table, resource type and
    /// parameter name.
    pub fn index(
        kind: IndexKind,
        resource_type: &ResourceType,
        parameter: &str,
        clause: SqlFragment,
    ) -> Self {
        let mut parameters = Vec::with_capacity(clause.params.len() + 2);
        parameters.push(SqlParam::string(resource_type.name()));
        parameters.push(SqlParam::string(parameter));
        parameters.extend(clause.params);

        let query = Self {
            condition: format!(
                "SELECT resourceId FROM {} WHERE resourceType = ? AND index_name = ? AND {}",
                kind.table(),
                clause.sql
            ),
            parameters,
        };
        tracing::trace!(sql = %query.condition, params = query.parameters.len(), "Compiled index query");
        query
    }

    /// Number of `?` placeholders in the condition.
    pub fn placeholder_count(&self) -> usize {
        self.condition.matches('?').count()
    }
}
