//! String criteria against `StringIndexEntity`.

use helios_fhir_values::ResourceType;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

use super::check_prefix;

/// How a string value is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatch {
    /// Prefix match, ignoring ASCII case.
    #[default]
    StartsWith,
    /// Exact, case-sensitive match (`:exact`).
    Exact,
    /// Substring match ignoring ASCII case (`:contains`).
    Contains,
}

/// Filters on a string search parameter.
///
/// Only `eq` and `ne` are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// The text searched for.
    pub value: Option<String>,
    /// How `value` is matched.
    pub matching: StringMatch,
}

impl StringFilter {
    /// Creates a filter on `parameter` without a value.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            prefix: None,
            value: None,
            matching: StringMatch::default(),
        }
    }

    /// Sets the comparison prefix.
    pub fn with_prefix(mut self, prefix: SearchPrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Sets the text.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the matching mode.
    pub fn with_matching(mut self, matching: StringMatch) -> Self {
        self.matching = matching;
        self
    }

    /// Compiles the filter for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType) -> Result<CompiledQuery> {
        let prefix = check_prefix(&self.parameter, self.prefix, IndexKind::String)?;
        let value = self.value.as_deref().ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;

        let clause = match self.matching {
            StringMatch::Exact => {
                SqlFragment::with_params("index_value = ?", vec![SqlParam::string(value)])
            }
            StringMatch::StartsWith => like(format!("{}%", escape_like(value))),
            StringMatch::Contains => like(format!("%{}%", escape_like(value))),
        };
        let clause = if prefix == SearchPrefix::Ne {
            clause.negate()
        } else {
            clause
        };

        Ok(CompiledQuery::index(IndexKind::String, resource_type, &self.parameter, clause))
    }
}

// SQLite folds case for ASCII letters only, so the pattern is bound as
// written; other letters must match in case.
fn like(pattern: String) -> SqlFragment {
    SqlFragment::with_params(
        "index_value COLLATE NOCASE LIKE ? ESCAPE '\\'",
        vec![SqlParam::String(pattern)],
    )
}

/// Escapes LIKE wildcards so they match literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> ResourceType {
        ResourceType::parse("Patient").unwrap()
    }

    #[test]
    fn test_string_default_starts_with() {
        let query = StringFilter::new("family")
            .with_value("Sm")
            .query(&patient())
            .unwrap();

        assert!(query.condition.starts_with("SELECT resourceId FROM StringIndexEntity"));
        assert!(query.condition.ends_with("AND index_value COLLATE NOCASE LIKE ? ESCAPE '\\'"));
        assert_eq!(query.parameters[2], SqlParam::string("Sm%"));
    }

    #[test]
    fn test_string_exact() {
        let query = StringFilter::new("family")
            .with_value("Smith")
            .with_matching(StringMatch::Exact)
            .query(&patient())
            .unwrap();

        assert!(query.condition.ends_with("AND index_value = ?"));
        assert_eq!(query.parameters[2], SqlParam::string("Smith"));
    }

    #[test]
    fn test_string_contains_escapes_wildcards() {
        let query = StringFilter::new("address")
            .with_value("50%_Off")
            .with_matching(StringMatch::Contains)
            .query(&patient())
            .unwrap();

        assert_eq!(query.parameters[2], SqlParam::string("%50\\%\\_Off%"));
    }

    #[test]
    fn test_string_non_ascii_pattern_is_bound_as_written() {
        let query = StringFilter::new("family")
            .with_value("Éluard")
            .query(&patient())
            .unwrap();

        assert!(query.condition.contains("COLLATE NOCASE LIKE"));
        assert!(!query.condition.contains("LOWER("));
        assert_eq!(query.parameters[2], SqlParam::string("Éluard%"));
    }

    #[test]
    fn test_string_ne_negates() {
        let query = StringFilter::new("family")
            .with_prefix(SearchPrefix::Ne)
            .with_value("Smith")
            .with_matching(StringMatch::Exact)
            .query(&patient())
            .unwrap();

        assert!(query.condition.ends_with("AND NOT (index_value = ?)"));
    }

    #[test]
    fn test_string_rejects_ordering_prefix() {
        let err = StringFilter::new("family")
            .with_prefix(SearchPrefix::Gt)
            .with_value("Smith")
            .query(&patient())
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::UnsupportedPrefix {
                parameter: "family".to_string(),
                prefix: SearchPrefix::Gt,
                kind: "string",
            }
        );
    }

    #[test]
    fn test_string_missing_value() {
        let err = StringFilter::new("family").query(&patient()).unwrap_err();
        assert!(matches!(err, SearchError::MissingOperand { .. }));
    }
}
