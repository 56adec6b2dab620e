//! Migrate command handler
//!
//! Handles database migration operations including dry-run and rollback.

use crate::config::settings::Settings;
use crate::db::migrations;
use crate::error::AppResult;

/// Handler for the migrate command
pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    /// Create a new migrate command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the migrate command with dry-run and rollback support
    ///
    /// # Errors
    /// - Database connection errors
    /// - Migration execution errors
    /// - Configuration validation errors
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;

        if dry_run {
            return self.show_pending_migrations().await;
        }

        match rollback {
            Some(steps) => self.rollback_migrations(steps).await,
            None => self.run_migrations().await,
        }
    }

    fn database_url(&self) -> String {
        self.config.database.connection_url()
    }

    /// Show pending migrations without applying them
    async fn show_pending_migrations(&self) -> AppResult<()> {
        println!("Checking for pending migrations...");

        let pending = migrations::pending_migrations(self.database_url()).await?;

        if pending.is_empty() {
            println!("✓ No pending migrations found - database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for name in &pending {
                println!("  - {}", name);
            }
            println!("\nRun without --dry-run to apply these migrations");
        }

        Ok(())
    }

    /// Run pending migrations
    async fn run_migrations(&self) -> AppResult<()> {
        println!("Running database migrations...");

        let applied = migrations::run_pending_migrations(self.database_url()).await?;
        tracing::info!(count = applied.len(), "Database migrations applied");

        if applied.is_empty() {
            println!("✓ No pending migrations - database is up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {}", version);
            }
        }

        Ok(())
    }

    /// Revert the most recent `steps` migrations
    async fn rollback_migrations(&self, steps: u32) -> AppResult<()> {
        println!("Rolling back {} migration(s)...", steps);

        let reverted = migrations::revert_migrations(self.database_url(), steps).await?;
        tracing::info!(requested = steps, reverted = reverted.len(), "Database migrations reverted");

        for version in &reverted {
            println!("  - reverted {}", version);
        }
        if (reverted.len() as u32) < steps {
            println!(
                "Only {} migration(s) were applied, nothing more to revert",
                reverted.len()
            );
        }
        println!("✓ Rollback completed");

        Ok(())
    }
}
