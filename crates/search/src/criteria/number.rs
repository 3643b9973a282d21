//! Number criteria against `NumberIndexEntity`.

use std::str::FromStr;

use helios_fhir_values::{Decimal, ResourceType};

use crate::config::{ApproximationPolicy, SearchConfig};
use crate::error::{Result, SearchError};
use crate::prefix::SearchPrefix;
use crate::query::{CompiledQuery, IndexKind, SqlFragment, SqlParam};

/// Filters on a numeric search parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFilter {
    /// Search parameter name, matched against `index_name`.
    pub parameter: String,
    /// Comparison prefix; `eq` when unset.
    pub prefix: Option<SearchPrefix>,
    /// The number compared against.
    pub value: Option<Decimal>,
}

impl NumberFilter {
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

    /// Sets the number.
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    /// Parses a raw search value such as `ge5.4`.
    pub fn parse(parameter: impl Into<String>, raw: &str) -> Result<Self> {
        let parameter = parameter.into();
        let (prefix, number) = SearchPrefix::extract(raw);
        let value = parse_decimal(&parameter, raw, number)?;
        Ok(Self {
            parameter,
            prefix: Some(prefix),
            value: Some(value),
        })
    }

    /// Compiles the filter for `resource_type`.
    pub fn query(&self, resource_type: &ResourceType, config: &SearchConfig) -> Result<CompiledQuery> {
        let value = self.value.ok_or_else(|| SearchError::MissingOperand {
            parameter: self.parameter.clone(),
            field: "value",
        })?;
        let prefix = self.prefix.unwrap_or_default();

        let clause = numeric_clause("index_value", prefix, value, &config.approximation);
        Ok(CompiledQuery::index(IndexKind::Number, resource_type, &self.parameter, clause))
    }
}

/// Builds the comparison on a numeric column. Every prefix is supported;
/// `sa` and `eb` behave as `gt` and `lt`.
pub(crate) fn numeric_clause(
    column: &str,
    prefix: SearchPrefix,
    value: Decimal,
    policy: &ApproximationPolicy,
) -> SqlFragment {
    let single = |op: &str| {
        SqlFragment::with_params(format!("{} {} ?", column, op), vec![SqlParam::decimal(value)])
    };

    match prefix {
        SearchPrefix::Eq => single("="),
        SearchPrefix::Ne => single("!="),
        SearchPrefix::Gt | SearchPrefix::Sa => single(">"),
        SearchPrefix::Lt | SearchPrefix::Eb => single("<"),
        SearchPrefix::Ge => single(">="),
        SearchPrefix::Le => single("<="),
        SearchPrefix::Ap => {
            let (low, high) = policy.bounds(value);
            SqlFragment::with_params(
                format!("{col} >= ? AND {col} <= ?", col = column),
                vec![SqlParam::decimal(low), SqlParam::decimal(high)],
            )
        }
    }
}

pub(crate) fn parse_decimal(parameter: &str, raw: &str, number: &str) -> Result<Decimal> {
    Decimal::from_str(number)
        .or_else(|_| Decimal::from_scientific(number))
        .map_err(|e| SearchError::InvalidValue {
            parameter: parameter.to_string(),
            value: raw.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::FilterCriterion;
    use rust_decimal_macros::dec;

    fn risk_assessment() -> ResourceType {
        ResourceType::parse("RiskAssessment").unwrap()
    }

    #[test]
    fn test_number_eq_binds_exact_value() {
        let filter = NumberFilter::new("probability").with_value(dec!(0.8));
        let query = filter.query(&risk_assessment(), &SearchConfig::default()).unwrap();

        assert!(query.condition.ends_with("AND index_value = ?"));
        assert_eq!(
            query.parameters,
            vec![
                SqlParam::string("RiskAssessment"),
                SqlParam::string("probability"),
                SqlParam::decimal(dec!(0.8)),
            ]
        );
    }

    #[test]
    fn test_number_starts_after_is_greater_than() {
        let gt = NumberFilter::parse("probability", "gt0.5").unwrap();
        let sa = NumberFilter::parse("probability", "sa0.5").unwrap();
        let config = SearchConfig::default();

        assert_eq!(
            gt.query(&risk_assessment(), &config).unwrap(),
            sa.query(&risk_assessment(), &config).unwrap()
        );
    }

    #[test]
    fn test_number_ap_uses_policy() {
        let filter = NumberFilter::parse("probability", "ap100").unwrap();
        let query = filter.query(&risk_assessment(), &SearchConfig::default()).unwrap();

        assert!(query.condition.ends_with("index_value >= ? AND index_value <= ?"));
        assert_eq!(query.parameters[2], SqlParam::decimal(dec!(90)));
        assert_eq!(query.parameters[3], SqlParam::decimal(dec!(110)));
        assert_eq!(query.parameters.len(), query.placeholder_count());
    }

    #[test]
    fn test_number_ap_near_decimal_max() {
        let filter = FilterCriterion::parse(
            IndexKind::Number,
            "probability",
            "ap75000000000000000000000000000",
        )
        .unwrap();
        let query = filter.query(&risk_assessment(), &SearchConfig::default()).unwrap();

        assert_eq!(query.parameters[2], SqlParam::decimal(dec!(67500000000000000000000000000)));
        assert_eq!(query.parameters[3], SqlParam::decimal(Decimal::MAX));

        let query = NumberFilter::new("probability")
            .with_prefix(SearchPrefix::Ap)
            .with_value(Decimal::MAX)
            .query(&risk_assessment(), &SearchConfig::default())
            .unwrap();
        assert_eq!(query.parameters[3], SqlParam::decimal(Decimal::MAX));
    }

    #[test]
    fn test_number_missing_value() {
        let err = NumberFilter::new("probability")
            .query(&risk_assessment(), &SearchConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::MissingOperand {
                parameter: "probability".to_string(),
                field: "value",
            }
        );
    }

    #[test]
    fn test_number_parse_scientific_and_invalid() {
        let filter = NumberFilter::parse("probability", "le1e2").unwrap();
        assert_eq!(filter.value, Some(dec!(100)));
        assert_eq!(filter.prefix, Some(SearchPrefix::Le));

        assert!(matches!(
            NumberFilter::parse("probability", "ten"),
            Err(SearchError::InvalidValue { .. })
        ));
    }
}
