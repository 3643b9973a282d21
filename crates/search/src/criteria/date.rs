//! Date criteria against `DateIndexEntity`.
//!
//! Both the search value and each indexed value are instant ranges: a
//! partial date such as `2024-03` covers the whole month. The index stores
//! `index_from` and `index_to` as inclusive epoch milliseconds.
//!
//! | prefix | matches when the indexed range ...      |
//! |--------|-----------------------------------------|
//! | `eq`   | lies within the search range            |
//! | `ne`   | does not lie within the search range    |
//! | `gt`   | ends after the search range             |
//! | `ge`   | ends at or after the search range start |
//! | `lt`   | starts before the search range          |
//! | `le`   | starts at or before the search range end|
//! | `sa`   | starts after the search range ends      |
//! | `eb`   | ends before the search range starts     |
//! | `ap`   | overlaps the widened search range       |

use helios_fhir_values::{FhirDate, FhirDateTime, ResourceType, TimeRange};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

/// Filters on a date or dateTime search parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// The date or dateTime whose range is compared.
    pub value: Option<FhirDateTime>,
}

impl DateFilter {
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

    /// Sets the dateTime value.
    pub fn with_value(mut self, value: FhirDateTime) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets a date value, covering its whole day, month or year.
    pub fn with_date(self, value: FhirDate) -> Self {
        self.with_value(FhirDateTime::from(value))
    }

    /// Parses a raw search value such as `ge2024-03` or `lt2024-03-15T10:00:00Z`.
    pub fn parse(parameter: impl Into<String>, raw: &str) -> Result<Self> {
        let parameter = parameter.into();
        let (prefix, text) = SearchPrefix::extract(raw);
        let value = FhirDateTime::parse(text).map_err(|e| SearchError::InvalidValue {
            parameter: parameter.clone(),
            value: raw.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            parameter,
            prefix: Some(prefix),
            value: Some(value),
        })
    }

    /// Compiles the filter for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType, config: &SearchConfig) -> Result<CompiledQuery> {
        let value = self.value.as_ref().ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;
        let prefix = self.prefix.unwrap_or_default();

        let clause = date_clause(prefix, value.range(), config);
        Ok(CompiledQuery::index(IndexKind::Date, resource_type, &self.parameter, clause))
    }
}

fn date_clause(prefix: SearchPrefix, range: TimeRange, config: &SearchConfig) -> SqlFragment {
    let start = SqlParam::integer(range.start_millis());
    let end = SqlParam::integer(range.end_inclusive_millis());

    match prefix {
        SearchPrefix::Eq => {
            SqlFragment::with_params("index_from >= ? AND index_to <= ?", vec![start, end])
        }
        SearchPrefix::Ne => {
            SqlFragment::with_params("(index_from < ? OR index_to > ?)", vec![start, end])
        }
        SearchPrefix::Gt => SqlFragment::with_params("index_to > ?", vec![end]),
        SearchPrefix::Ge => SqlFragment::with_params("index_to >= ?", vec![start]),
        SearchPrefix::Lt => SqlFragment::with_params("index_from < ?", vec![start]),
        SearchPrefix::Le => SqlFragment::with_params("index_from <= ?", vec![end]),
        SearchPrefix::Sa => SqlFragment::with_params("index_from > ?", vec![end]),
        SearchPrefix::Eb => SqlFragment::with_params("index_to < ?", vec![start]),
        SearchPrefix::Ap => {
            let widened = range.widen(config.date_approximation());
            SqlFragment::with_params(
                "index_from <= ? AND index_to >= ?",
                vec![
                    SqlParam::integer(widened.end_inclusive_millis()),
                    SqlParam::integer(widened.start_millis()),
                ],
            )
        }
    }
}
