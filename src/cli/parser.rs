//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Catalog of services and their versions over HTTP
#[derive(Parser, Debug)]
#[command(name = "service-catalog")]
#[command(about = "Catalog of services and their versions over HTTP")]
#[command(long_about = "
service-catalog keeps a catalog of named services and their versions in
PostgreSQL and exposes it over a JSON HTTP API with paginated, filtered and
sorted listings.

EXAMPLES:
    # Start the server with default configuration
    service-catalog serve

    # Start server on custom host and port
    service-catalog serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    service-catalog --config /path/to/config.toml serve

    # Check configuration without starting server
    service-catalog serve --dry-run

    # Run database migrations
    service-catalog migrate

    # Preview pending migrations
    service-catalog migrate --dry-run

    # Rollback the last migration
    service-catalog migrate --rollback 1
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    /// Environment variables still override values from the file.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{environment}.toml` is layered over the defaults.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   service-catalog serve                           # Start with defaults
    ///   service-catalog serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   service-catalog serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on (1-65535)
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override, takes precedence over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration, print the bind address and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    ///
    /// Examples:
    ///   service-catalog migrate                 # Apply all pending migrations
    ///   service-catalog migrate --dry-run       # Show pending migrations without applying
    ///   service-catalog migrate --rollback 1    # Revert the most recent migration
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to revert (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
