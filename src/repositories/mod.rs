//! Store layer for catalog data access.
//!
//! `CatalogStore` is the single seam between the catalog engines and
//! persistence. The process bootstrap picks one implementation and shares
//! it as `Arc<dyn CatalogStore>`.

mod memory_store;
mod pg_store;

pub use memory_store::InMemoryCatalogStore;
pub use pg_store::PgCatalogStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    NewService, NewVersion, PageRequest, Service, ServiceChanges, ServiceFilter, SortOrder, Version,
};

/// Persistence operations over services and their versions.
///
/// Every lookup only sees live rows. The three multi-row writes
/// (`insert_version`, `soft_delete_version`, `soft_delete_service`) are
/// atomic units of work: either every row they touch changes, or none do.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Round-trips to the backing store.
    async fn ping(&self) -> AppResult<()>;

    /// Number of live services matching `filter`.
    async fn count_services(&self, filter: &ServiceFilter) -> AppResult<i64>;

    /// One page of live services matching `filter`, ordered by name in the
    /// requested direction with id as tie-breaker.
    async fn list_services(
        &self,
        filter: &ServiceFilter,
        sort: SortOrder,
        page: PageRequest,
    ) -> AppResult<Vec<Service>>;

    async fn find_service_by_name(&self, name: &str) -> AppResult<Option<Service>>;

    async fn find_service_by_id(&self, id: i32) -> AppResult<Option<Service>>;

    async fn insert_service(&self, new_service: NewService) -> AppResult<Service>;

    /// Applies `changes` to the live service `id`; `None` when no live row
    /// matched.
    async fn update_service(&self, id: i32, changes: ServiceChanges)
    -> AppResult<Option<Service>>;

    /// Live versions of the live service called `name`.
    async fn count_versions_by_service_name(&self, name: &str) -> AppResult<i64>;

    /// One page of the service's live versions in creation order.
    async fn list_versions(&self, service_id: i32, page: PageRequest) -> AppResult<Vec<Version>>;

    async fn find_version(&self, service_id: i32, name: &str) -> AppResult<Option<Version>>;

    /// Inserts the version and increments the owner's `version_count`.
    ///
    /// Fails with `DuplicateVersion` when a live version with the same name
    /// already exists under `service`, and with `ServiceNotFound` when the
    /// service stopped being live after it was looked up.
    async fn insert_version(&self, service: &Service, new_version: NewVersion)
    -> AppResult<Version>;

    /// Soft-deletes the version and decrements the owner's `version_count`.
    ///
    /// Returns `false`, changing nothing, when the version is no longer live.
    /// Fails with `ServiceNotFound` when the owner is no longer live.
    async fn soft_delete_version(&self, service_id: i32, version_id: i32) -> AppResult<bool>;

    /// Soft-deletes every live version of the service, then the service.
    ///
    /// Returns the number of versions that were soft-deleted.
    async fn soft_delete_service(&self, service_id: i32) -> AppResult<usize>;
}
