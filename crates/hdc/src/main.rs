//! Helios Data Capture CLI (hdc)
//!
//! Validates questionnaire responses and compiles FHIR search filters,
//! printing JSON to stdout.

mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use helios_datacapture::MessageBundle;
use helios_search::SearchConfig;
use tracing::info;

use crate::config::{CliConfig, Command};

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays valid JSON. `RUST_LOG` overrides `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hdc={level},helios_datacapture={level},helios_search={level}",
            level = level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    let base = match &config.search_config {
        Some(path) => serde_json::from_value(commands::read_json(path)?)?,
        None => SearchConfig::default(),
    };
    let search_config = config.search_settings(base);
    if let Err(errors) = search_config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        return Ok(ExitCode::FAILURE);
    }

    match &config.command {
        Command::Validate {
            questionnaire,
            response,
            bundle,
        } => {
            let bundle = match bundle {
                Some(path) => serde_json::from_value(commands::read_json(path)?)?,
                None => MessageBundle::english(),
            };
            info!(questionnaire = %questionnaire.display(), response = %response.display(), "Validating");

            let validation = commands::validate(
                &commands::read_json(questionnaire)?,
                &commands::read_json(response)?,
                &bundle,
            )?;
            println!("{}", serde_json::to_string_pretty(&validation)?);

            if validation.is_valid() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }
        Command::Search {
            resource_type,
            kind,
            param,
            values,
            count,
            from,
            index_only,
        } => {
            let output = commands::search(
                resource_type,
                *kind,
                param,
                values,
                *count,
                *from,
                *index_only,
                &search_config,
            )?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
