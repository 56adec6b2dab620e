//! Application state for Axum web framework.
//!
//! Contains the catalog engines and the store handle they share.

use std::sync::Arc;

use crate::repositories::CatalogStore;
use crate::services::Services;

/// Application state shared by all request handlers.
///
/// Cloning is cheap since the engines and the store are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Query and mutation engines
    pub services: Services,
    /// Direct access to the store, used by health checks
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Builds the engines over `store` and keeps a handle for health checks.
    ///
    /// # Example
    /// ```ignore
    /// let store = Arc::new(PgCatalogStore::new(pool));
    /// let state = AppState::new(store, settings.catalog.page_size);
    /// ```
    pub fn new(store: Arc<dyn CatalogStore>, page_size: i64) -> Self {
        Self {
            services: Services::new(store.clone(), page_size),
            store,
        }
    }
}
