//! Async database connection pool implementation.
//!
//! Uses the bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Migrations compiled into the binary from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool sized from the configuration.
///
/// Connections are established lazily; a pool is returned even when the
/// database is not reachable yet.
///
/// # Example
///
/// ```ignore
/// let pool = establish_async_connection_pool(&settings.database).await?;
/// let mut conn = pool.get().await?;
/// ```
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.connection_url());

    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::Configuration {
            key: "database".to_string(),
            source: anyhow::Error::from(e),
        })
}
