//! Command-line configuration for `hdc`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HDC_LOG_LEVEL` | warn | Log level |
//! | `HDC_MESSAGE_BUNDLE` | (English) | JSON message bundle for `validate` |
//! | `HDC_SEARCH_CONFIG` | (defaults) | JSON search configuration for `search` |
//! | `HDC_APPROXIMATION_TOLERANCE` | 0.1 | Relative tolerance for `ap` |
//! | `HDC_APPROXIMATION_SCALE` | (none) | Decimal places `ap` bounds are rounded to |
//! | `HDC_DATE_APPROXIMATION_SECS` | 86400 | Seconds `ap` adds around a date |

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use helios_fhir_values::ResourceType;
use helios_search::{IndexKind, SearchConfig};
use rust_decimal::Decimal;

/// Helios data capture tools.
#[derive(Debug, Clone, Parser)]
#[command(name = "hdc")]
#[command(about = "Validate questionnaire responses and compile FHIR search filters")]
#[command(version)]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HDC_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// JSON file with search settings.
    #[arg(long, env = "HDC_SEARCH_CONFIG", global = true)]
    pub search_config: Option<PathBuf>,

    /// Relative tolerance for the `ap` prefix, e.g. 0.1 for ±10%.
    #[arg(long, env = "HDC_APPROXIMATION_TOLERANCE", global = true)]
    pub approximation_tolerance: Option<Decimal>,

    /// Decimal places `ap` bounds are rounded to.
    #[arg(long, env = "HDC_APPROXIMATION_SCALE", global = true)]
    pub approximation_scale: Option<u32>,

    /// Seconds `ap` adds on each side of a date.
    #[arg(long, env = "HDC_DATE_APPROXIMATION_SECS", global = true)]
    pub date_approximation_secs: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a QuestionnaireResponse against its Questionnaire.
    Validate {
        /// Questionnaire JSON file.
        #[arg(long)]
        questionnaire: PathBuf,

        /// QuestionnaireResponse JSON file.
        #[arg(long)]
        response: PathBuf,

        /// Message bundle JSON file.
        #[arg(long, env = "HDC_MESSAGE_BUNDLE")]
        bundle: Option<PathBuf>,
    },

    /// Compile search filters into SQL.
    Search {
        /// Resource type searched, e.g. Observation.
        #[arg(long)]
        resource_type: ResourceType,

        /// Parameter kind: string, token, quantity, number, date or reference.
        #[arg(long)]
        kind: IndexKind,

        /// Search parameter name, e.g. value-quantity.
        #[arg(long)]
        param: String,

        /// Raw search value, e.g. ge5.4|http://unitsofmeasure.org|mg. Repeat for OR.
        #[arg(long = "value", required = true)]
        values: Vec<String>,

        /// Maximum number of results, capped by the configured max count.
        #[arg(long)]
        count: Option<u32>,

        /// Number of results to skip.
        #[arg(long)]
        from: Option<u32>,

        /// Print only the index query for a single value.
        #[arg(long)]
        index_only: bool,
    },
}

impl CliConfig {
    /// Applies command-line overrides on top of `base`.
    pub fn search_settings(&self, base: SearchConfig) -> SearchConfig {
        let mut config = base;
        if let Some(tolerance) = self.approximation_tolerance {
            config.approximation.tolerance = tolerance;
        }
        if let Some(scale) = self.approximation_scale {
            config.approximation.scale = Some(scale);
        }
        if let Some(secs) = self.date_approximation_secs {
            config.date_approximation_secs = secs;
        }
        config
    }
}
