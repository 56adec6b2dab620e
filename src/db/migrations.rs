//! Blocking migration runner.
//!
//! Diesel's migration harness needs a synchronous connection, so every
//! entry point hops onto the blocking thread pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;

use crate::db::MIGRATIONS;
use crate::error::{AppError, AppResult};

fn connect(database_url: &str) -> AppResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|e| {
        AppError::store(
            "establish connection for migrations",
            anyhow::anyhow!("Connection error: {}", e),
        )
    })
}

fn migration_error(operation: &str, e: impl std::fmt::Display) -> AppError {
    AppError::store(operation, anyhow::anyhow!("Migration error: {}", e))
}

async fn blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
}

/// Names of migrations not yet applied.
pub async fn pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    blocking(move || {
        let mut conn = connect(&database_url)?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("check pending migrations", e))?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Applies every pending migration and returns the applied versions.
pub async fn run_pending_migrations(database_url: String) -> AppResult<Vec<String>> {
    blocking(move || {
        let mut conn = connect(&database_url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| migration_error("run pending migrations", e))?;
        Ok(applied.iter().map(|v| v.to_string()).collect())
    })
    .await
}

/// Reverts the last `steps` migrations and returns the reverted versions.
pub async fn revert_migrations(database_url: String, steps: u32) -> AppResult<Vec<String>> {
    blocking(move || {
        let mut conn = connect(&database_url)?;
        let mut reverted = Vec::new();
        for _ in 0..steps {
            match conn.revert_last_migration(MIGRATIONS) {
                Ok(version) => reverted.push(version.to_string()),
                Err(e) if reverted.is_empty() => {
                    return Err(migration_error("revert migration", e));
                }
                // Nothing left to revert
                Err(_) => break,
            }
        }
        Ok(reverted)
    })
    .await
}
