//! Service layer for catalog operations.
//!
//! The query and mutation engines hold no state of their own beyond the
//! shared store handle, so handlers may call them concurrently.

mod catalog_mutation;
mod catalog_query;

pub use catalog_mutation::CatalogMutationService;
pub use catalog_query::CatalogQueryService;

use std::sync::Arc;

use crate::repositories::CatalogStore;

/// Aggregates the catalog engines for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since both engines share the store through an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub query: CatalogQueryService,
    pub mutation: CatalogMutationService,
}

impl Services {
    /// Creates both engines over the same store.
    pub fn new(store: Arc<dyn CatalogStore>, page_size: i64) -> Self {
        Self {
            query: CatalogQueryService::new(store.clone(), page_size),
            mutation: CatalogMutationService::new(store),
        }
    }
}
