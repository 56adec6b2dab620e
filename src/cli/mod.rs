//! Command-line interface
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command dispatch to the serve and migrate handlers

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::settings::Settings;
use crate::logger::init_logger;

/// Load the configuration the CLI points at and apply its overrides
///
/// # Errors
/// Returns error if configuration loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli).context("Configuration error")?;
    merger
        .merge_cli_args(cli)
        .context("Configuration merge error")
}

/// Install the global tracing subscriber described by `settings`
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
