//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output with multiple formats (Full, Compact, JSON)
//!
//! `RUST_LOG`, when set, overrides the configured level.

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::LogFileWriter;

/// Initialize the global subscriber with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter)?,
        (true, false) => init_console_only(&config.console, filter)?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => anyhow::bail!("At least one output (console or file) must be enabled"),
    }

    Ok(())
}

fn already_set(e: impl std::fmt::Display) -> LoggerError {
    LoggerError::config(format!("global subscriber already set: {}", e))
}

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(use_ansi))
        .try_init()
        .map_err(already_set)
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let writer = LogFileWriter::new(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Full => registry
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .try_init(),
    }
    .map_err(already_set)
}

/// Console layer used by the console-only and combined setups.
///
/// Built per subscriber stack since a `fmt::Layer` is typed by the
/// subscriber it is first layered onto.
fn console_layer<S>(use_ansi: bool) -> fmt::Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
}

/// File and console output stacked on one registry.
///
/// The file layer goes first so ANSI codes from the console layer do not
/// leak into span fields written to the file.
fn combined_subscriber(
    format: LogFormat,
    writer: LogFileWriter,
    use_ansi: bool,
    filter: EnvFilter,
) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Full => Box::new(
            registry
                .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
                .with(console_layer(use_ansi)),
        ),
        LogFormat::Compact => Box::new(
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .compact()
                        .with_writer(writer),
                )
                .with(console_layer(use_ansi)),
        ),
        LogFormat::Json => Box::new(
            registry
                .with(fmt::layer().with_ansi(false).json().with_writer(writer))
                .with(console_layer(use_ansi)),
        ),
    }
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let use_ansi = config.console.colored && std::io::stdout().is_terminal();
    let writer = LogFileWriter::new(&config.file)?;

    combined_subscriber(config.file.format, writer, use_ansi, filter)
        .try_init()
        .map_err(already_set)
}
