//! Reference criteria against `ReferenceIndexEntity`.

use helios_fhir_values::ResourceType;

use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

use super::check_prefix;

/// Filters on a reference search parameter, e.g. `subject=Patient/123`.
///
/// Only `eq` and `ne` are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// Reference text such as `Patient/123`.
    pub value: Option<String>,
}

impl ReferenceFilter {
    /// Creates a filter on `parameter` without a value.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            prefix: None,
            value: None,
        }
    }

    /// Sets the comparison prefix.
    pub fn with_prefix(mut self, prefix: SearchPrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Sets the reference text.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Targets `{type}/{id}`.
    pub fn with_target(self, target_type: &ResourceType, id: &str) -> Self {
        self.with_value(format!("{}/{}", target_type, id))
    }

    /// Compiles the filter for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType) -> Result<CompiledQuery> {
        let prefix = check_prefix(&self.parameter, self.prefix, IndexKind::Reference)?;
        let value = self.value.as_deref().ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;

        let op = if prefix == SearchPrefix::Ne { "!=" } else { "=" };
        let clause =
            SqlFragment::with_params(format!("index_value {} ?", op), vec![SqlParam::string(value)]);

        Ok(CompiledQuery::index(IndexKind::Reference, resource_type, &self.parameter, clause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_eq() {
        let observation = ResourceType::parse("Observation").unwrap();
        let patient = ResourceType::parse("Patient").unwrap();

        let query = ReferenceFilter::new("subject")
            .with_target(&patient, "123")
            .query(&observation)
            .unwrap();

        assert_eq!(
            query.condition,
            "SELECT resourceId FROM ReferenceIndexEntity WHERE resourceType = ? AND index_name = ? AND index_value = ?"
        );
        assert_eq!(
            query.parameters,
            vec![
                SqlParam::string("Observation"),
                SqlParam::string("subject"),
                SqlParam::string("Patient/123"),
            ]
        );
    }

    #[test]
    fn test_reference_ne_and_unsupported() {
        let observation = ResourceType::parse("Observation").unwrap();

        let ne = ReferenceFilter::new("subject")
            .with_prefix(SearchPrefix::Ne)
            .with_value("Patient/1")
            .query(&observation)
            .unwrap();
        assert!(ne.condition.ends_with("index_value != ?"));

        let err = ReferenceFilter::new("subject")
            .with_prefix(SearchPrefix::Lt)
            .with_value("Patient/1")
            .query(&observation)
            .unwrap_err();
        assert!(matches!(err, SearchError::UnsupportedPrefix { .. }));
    }
}
