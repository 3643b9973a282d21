//! Subcommand implementations.
//!
//! Each command returns the JSON document to print so it can be tested
//! without touching the filesystem.

use std::fs;
use std::path::Path;

use anyhow::Context;
use helios_datacapture::{
    MessageBundle, Questionnaire, QuestionnaireResponse, QuestionnaireResponseValidator,
    ResponseValidation,
};
use helios_fhir_values::ResourceType;
use helios_search::{FilterCriterion, IndexKind, Search, SearchConfig};
use serde_json::Value;
use tracing::{debug, info};

/// Reads a JSON file.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Validates a response against a questionnaire.
pub fn validate(
    questionnaire: &Value,
    response: &Value,
    bundle: &MessageBundle,
) -> anyhow::Result<ResponseValidation> {
    let questionnaire = Questionnaire::from_json(questionnaire)?;
    let response = QuestionnaireResponse::from_json(response)?;

    if let (Some(expected), Some(answered)) = (&questionnaire.url, &response.questionnaire) {
        if expected != answered {
            tracing::warn!(
                questionnaire = %expected,
                response = %answered,
                "Response was written for a different questionnaire"
            );
        }
    }

    let validation =
        QuestionnaireResponseValidator::default().validate(&questionnaire, &response, bundle)?;
    info!(
        items = validation.items.len(),
        valid = validation.is_valid(),
        locale = %bundle.locale,
        "Validated response"
    );
    Ok(validation)
}

/// Compiles one or more values of a search parameter.
///
/// Several values are ORed together. With `index_only` the single value's
/// index-table query is returned instead of the full resource query.
#[allow(clippy::too_many_arguments)]
pub fn search(
    resource_type: &ResourceType,
    kind: IndexKind,
    param: &str,
    values: &[String],
    count: Option<u32>,
    from: Option<u32>,
    index_only: bool,
    config: &SearchConfig,
) -> anyhow::Result<Value> {
    let criteria = values
        .iter()
        .map(|raw| FilterCriterion::parse(kind, param, raw))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(criteria = criteria.len(), %kind, param, "Parsed search values");

    let query = if index_only {
        let [criterion] = criteria.as_slice() else {
            anyhow::bail!("--index-only takes exactly one --value");
        };
        criterion.query(resource_type, config)?
    } else {
        let mut search = Search::new(resource_type.clone());
        for criterion in criteria {
            search = search.filter(criterion);
        }
        if let Some(count) = count {
            search = search.count(count);
        }
        if let Some(from) = from {
            search = search.from(from);
        }
        search.query(config)?
    };

    Ok(serde_json::to_value(&query)?)
}
