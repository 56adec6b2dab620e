//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_app;
use crate::config::{Environment, settings::Settings};
use crate::db::{establish_async_connection_pool, migrations};
use crate::repositories::PgCatalogStore;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Initializes the database connection pool
    /// 3. Applies pending migrations when `database.auto_migrate` is set
    /// 4. Builds the catalog store and application state
    /// 5. Binds and serves with graceful shutdown
    ///
    /// # Errors
    /// - Database connection pool initialization errors
    /// - Migration errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            keep_alive_timeout = %self.settings.server.keep_alive_timeout,
            "Server configuration loaded"
        );

        // Connection URL may carry a password, so only pool sizing is logged
        tracing::info!(
            max_connections = %self.settings.database.max_connections,
            min_connections = %self.settings.database.min_connections,
            connection_timeout = %self.settings.database.connection_timeout,
            auto_migrate = %self.settings.database.auto_migrate,
            "Database configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            page_size = %self.settings.catalog.page_size,
            "Configuration loaded successfully"
        );

        tracing::info!("Initializing database connection pool...");
        let pool = establish_async_connection_pool(&self.settings.database).await?;
        tracing::info!("Database connection pool initialized");

        if self.settings.database.auto_migrate {
            let applied =
                migrations::run_pending_migrations(self.settings.database.connection_url())
                    .await?;
            tracing::info!(count = applied.len(), "Pending migrations applied");
        }

        let store = Arc::new(PgCatalogStore::new(pool));
        let state = AppState::new(store, self.settings.catalog.page_size);
        tracing::info!("Application state created");

        let app = create_app(
            state,
            Duration::from_secs(self.settings.server.request_timeout),
        );

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
