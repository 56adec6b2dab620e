//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// Running without a subcommand is the same as `serve`.
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    warn_about_command_args(cli);

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
    }
}

/// Surface argument combinations that parse fine but deserve a warning
fn warn_about_command_args(cli: &Cli) {
    match &cli.command {
        Some(Commands::Serve {
            host: Some(host),
            port: Some(port),
            ..
        }) if *port < 1024 && host == "0.0.0.0" => {
            tracing::warn!(
                port = port,
                "Binding to 0.0.0.0 on a privileged port requires root privileges"
            );
        }
        Some(Commands::Migrate {
            rollback: Some(steps),
            ..
        }) if *steps > 50 => {
            tracing::warn!(
                steps = steps,
                "Rolling back many migrations at once, consider smaller steps"
            );
        }
        _ => {}
    }
}
