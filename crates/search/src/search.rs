//! Combining criteria into one resource query.
//!
//! Criteria on the same parameter are alternatives and are joined with
//! `UNION`. Each parameter group then becomes one `resourceId IN (...)`
//! conjunct, so a resource must match every parameter. Every search is
//! bounded by a `LIMIT`.

use helios_fhir_values::ResourceType;

use crate::config::SearchConfig;
use crate::criteria::FilterCriterion;
use crate::error::Result;
use crate::query::{CompiledQuery, SqlParam};

/// A search over one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    resource_type: ResourceType,
    criteria: Vec<FilterCriterion>,
    count: Option<u32>,
    from: Option<u32>,
}

impl Search {
    /// Creates a search over `resource_type` with no criteria.
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            criteria: Vec::new(),
            count: None,
            from: None,
        }
    }

    /// Adds a criterion.
    pub fn filter(mut self, criterion: impl Into<FilterCriterion>) -> Self {
        self.criteria.push(criterion.into());
        self
    }

    /// Limits the number of results. Without a count, and for counts above
    /// [`SearchConfig::max_count`], the configured maximum applies.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Skips the first `from` results.
    pub fn from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }

    /// The resource type searched.
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Criteria in the order they were added.
    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    /// Compiles the search into a query returning serialized resources.
    ///
    /// Parameter groups appear in the order their first criterion was added.
    pub fn query(&self, config: &SearchConfig) -> Result<CompiledQuery> {
        let mut groups: Vec<(&str, Vec<CompiledQuery>)> = Vec::new();
        for criterion in &self.criteria {
            let compiled = criterion.query(&self.resource_type, config)?;
            match groups.iter_mut().find(|(p, _)| *p == criterion.parameter()) {
                Some((_, queries)) => queries.push(compiled),
                None => groups.push((criterion.parameter(), vec![compiled])),
            }
        }

        let mut condition = String::from(
            "SELECT a.serializedResource FROM ResourceEntity a WHERE a.resourceType = ?",
        );
        let mut parameters = vec![SqlParam::string(self.resource_type.name())];

        for (_, queries) in groups {
            let union = queries
                .iter()
                .map(|q| q.condition.as_str())
                .collect::<Vec<_>>()
                .join(" UNION ");
            condition.push_str(&format!(" AND a.resourceId IN ({})", union));
            parameters.extend(queries.into_iter().flat_map(|q| q.parameters));
        }

        let limit = match self.count {
            Some(count) if count > config.max_count => {
                tracing::debug!(requested = count, max = config.max_count, "Clamping search count");
                config.max_count
            }
            Some(count) => count,
            None => config.max_count,
        };
        condition.push_str(" LIMIT ?");
        parameters.push(SqlParam::integer(i64::from(limit)));
        if let Some(from) = self.from {
            condition.push_str(" OFFSET ?");
            parameters.push(SqlParam::integer(i64::from(from)));
        }

        tracing::trace!(
            resource_type = %self.resource_type,
            criteria = self.criteria.len(),
            sql = %condition,
            "Compiled search"
        );
        Ok(CompiledQuery {
            condition,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{QuantityFilter, StringFilter, TokenFilter};
    use crate::error::SearchError;
    use rust_decimal_macros::dec;

    fn observation() -> ResourceType {
        ResourceType::parse("Observation").unwrap()
    }

    #[test]
    fn test_search_without_criteria() {
        let query = Search::new(observation())
            .query(&SearchConfig::default())
            .unwrap();
        assert_eq!(
            query.condition,
            "SELECT a.serializedResource FROM ResourceEntity a WHERE a.resourceType = ? LIMIT ?"
        );
        assert_eq!(
            query.parameters,
            vec![SqlParam::string("Observation"), SqlParam::integer(1000)]
        );
    }

    #[test]
    fn test_same_parameter_is_union_different_is_and() {
        let query = Search::new(observation())
            .filter(TokenFilter::of_code("code", "8867-4"))
            .filter(QuantityFilter::new("value-quantity").with_value(dec!(60)))
            .filter(TokenFilter::of_code("code", "8480-6"))
            .query(&SearchConfig::default())
            .unwrap();

        let token = "SELECT resourceId FROM TokenIndexEntity WHERE resourceType = ? AND index_name = ? AND index_value = ?";
        let quantity = "SELECT resourceId FROM QuantityIndexEntity WHERE resourceType = ? AND index_name = ? AND index_value = ?";
        assert_eq!(
            query.condition,
            format!(
                "SELECT a.serializedResource FROM ResourceEntity a WHERE a.resourceType = ? \
                 AND a.resourceId IN ({t} UNION {t}) AND a.resourceId IN ({q}) LIMIT ?",
                t = token,
                q = quantity
            )
        );
        assert_eq!(
            query.parameters,
            vec![
                SqlParam::string("Observation"),
                SqlParam::string("Observation"),
                SqlParam::string("code"),
                SqlParam::string("8867-4"),
                SqlParam::string("Observation"),
                SqlParam::string("code"),
                SqlParam::string("8480-6"),
                SqlParam::string("Observation"),
                SqlParam::string("value-quantity"),
                SqlParam::decimal(dec!(60)),
                SqlParam::integer(1000),
            ]
        );
        assert_eq!(query.parameters.len(), query.placeholder_count());
    }

    #[test]
    fn test_paging() {
        let query = Search::new(observation())
            .count(10)
            .from(20)
            .query(&SearchConfig::default())
            .unwrap();
        assert!(query.condition.ends_with(" LIMIT ? OFFSET ?"));
        assert_eq!(
            &query.parameters[1..],
            &[SqlParam::integer(10), SqlParam::integer(20)]
        );

        let offset_only = Search::new(observation())
            .from(5)
            .query(&SearchConfig::default())
            .unwrap();
        assert!(offset_only.condition.ends_with(" LIMIT ? OFFSET ?"));
        assert_eq!(
            &offset_only.parameters[1..],
            &[SqlParam::integer(1000), SqlParam::integer(5)]
        );
    }

    #[test]
    fn test_count_is_clamped() {
        let config = SearchConfig {
            max_count: 50,
            ..Default::default()
        };
        let query = Search::new(observation()).count(500).query(&config).unwrap();
        assert_eq!(query.parameters[1], SqlParam::integer(50));

        let query = Search::new(observation()).count(20).query(&config).unwrap();
        assert_eq!(query.parameters[1], SqlParam::integer(20));
    }

    #[test]
    fn test_unpaged_search_uses_max_count() {
        let config = SearchConfig {
            max_count: 50,
            ..Default::default()
        };
        let query = Search::new(observation())
            .filter(TokenFilter::of_code("code", "8867-4"))
            .query(&config)
            .unwrap();
        assert!(query.condition.ends_with(" LIMIT ?"));
        assert!(!query.condition.contains("OFFSET"));
        assert_eq!(query.parameters.last(), Some(&SqlParam::integer(50)));
    }

    #[test]
    fn test_criterion_error_propagates() {
        let err = Search::new(observation())
            .filter(StringFilter::new("name"))
            .query(&SearchConfig::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingOperand { .. }));
    }
}
