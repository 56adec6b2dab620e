//! In-process implementation of [`CatalogStore`].
//!
//! Holds every row in a single mutex so each operation, including the
//! multi-row ones, is applied as one step. Used by the engine and HTTP
//! tests, and handy for running the API without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{
    NewService, NewVersion, PageRequest, Service, ServiceChanges, ServiceFilter, SortOrder,
    Version, current_timestamp,
};
use crate::repositories::CatalogStore;

#[derive(Default)]
struct State {
    services: Vec<Service>,
    versions: Vec<Version>,
    next_service_id: i32,
    next_version_id: i32,
}

impl State {
    fn live_service_mut(&mut self, id: i32) -> Option<&mut Service> {
        self.services
            .iter_mut()
            .find(|s| s.id == id && s.is_live())
    }

    fn name_taken(&self, name: &str, except_id: Option<i32>) -> bool {
        self.services
            .iter()
            .any(|s| s.is_live() && s.name == name && Some(s.id) != except_id)
    }
}

/// Catalog store kept entirely in memory.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    state: Mutex<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::store("lock catalog", anyhow::anyhow!("store mutex poisoned")))
    }

    /// Every stored service, including soft-deleted ones.
    pub fn all_services(&self) -> AppResult<Vec<Service>> {
        Ok(self.lock()?.services.clone())
    }

    /// Every stored version, including soft-deleted ones.
    pub fn all_versions(&self) -> AppResult<Vec<Version>> {
        Ok(self.lock()?.versions.clone())
    }
}

fn unique_violation(operation: &str, constraint: &str) -> AppError {
    AppError::store(
        operation,
        anyhow::anyhow!("Unique constraint {} violated", constraint),
    )
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }

    async fn count_services(&self, filter: &ServiceFilter) -> AppResult<i64> {
        let state = self.lock()?;
        let count = state
            .services
            .iter()
            .filter(|s| s.is_live() && filter.matches(s))
            .count();
        Ok(count as i64)
    }

    async fn list_services(
        &self,
        filter: &ServiceFilter,
        sort: SortOrder,
        page: PageRequest,
    ) -> AppResult<Vec<Service>> {
        let state = self.lock()?;
        let mut matching: Vec<Service> = state
            .services
            .iter()
            .filter(|s| s.is_live() && filter.matches(s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        if sort == SortOrder::Desc {
            matching.reverse();
        }

        Ok(matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn find_service_by_name(&self, name: &str) -> AppResult<Option<Service>> {
        let state = self.lock()?;
        Ok(state
            .services
            .iter()
            .find(|s| s.is_live() && s.name == name)
            .cloned())
    }

    async fn find_service_by_id(&self, id: i32) -> AppResult<Option<Service>> {
        let state = self.lock()?;
        Ok(state
            .services
            .iter()
            .find(|s| s.is_live() && s.id == id)
            .cloned())
    }

    async fn insert_service(&self, new_service: NewService) -> AppResult<Service> {
        let mut state = self.lock()?;
        if state.name_taken(&new_service.name, None) {
            return Err(unique_violation("insert service", "services_name_key"));
        }

        state.next_service_id += 1;
        let service = Service {
            id: state.next_service_id,
            name: new_service.name,
            description: new_service.description,
            version_count: new_service.version_count,
            created_at: new_service.created_at,
            deleted_at: None,
        };
        state.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: i32,
        changes: ServiceChanges,
    ) -> AppResult<Option<Service>> {
        let mut state = self.lock()?;
        if let Some(name) = changes.name.as_deref() {
            if state.name_taken(name, Some(id)) {
                return Err(unique_violation("update service", "services_name_key"));
            }
        }

        let Some(service) = state.live_service_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            service.name = name;
        }
        if let Some(description) = changes.description {
            service.description = description;
        }
        Ok(Some(service.clone()))
    }

    async fn count_versions_by_service_name(&self, name: &str) -> AppResult<i64> {
        let state = self.lock()?;
        let count = state
            .versions
            .iter()
            .filter(|v| v.is_live())
            .filter(|v| {
                state
                    .services
                    .iter()
                    .any(|s| s.id == v.service_id && s.is_live() && s.name == name)
            })
            .count();
        Ok(count as i64)
    }

    async fn list_versions(&self, service_id: i32, page: PageRequest) -> AppResult<Vec<Version>> {
        let state = self.lock()?;
        let mut live: Vec<Version> = state
            .versions
            .iter()
            .filter(|v| v.service_id == service_id && v.is_live())
            .cloned()
            .collect();
        live.sort_by_key(|v| v.id);

        Ok(live
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn find_version(&self, service_id: i32, name: &str) -> AppResult<Option<Version>> {
        let state = self.lock()?;
        Ok(state
            .versions
            .iter()
            .find(|v| v.service_id == service_id && v.name == name && v.is_live())
            .cloned())
    }

    async fn insert_version(
        &self,
        service: &Service,
        new_version: NewVersion,
    ) -> AppResult<Version> {
        let mut state = self.lock()?;

        let duplicate = state.versions.iter().any(|v| {
            v.service_id == new_version.service_id && v.name == new_version.name && v.is_live()
        });
        if duplicate {
            return Err(AppError::DuplicateVersion {
                service: service.name.clone(),
                version: new_version.name,
            });
        }

        let Some(owner) = state.live_service_mut(new_version.service_id) else {
            return Err(AppError::service_not_found_by_name(&service.name));
        };
        owner.version_count += 1;

        state.next_version_id += 1;
        let version = Version {
            id: state.next_version_id,
            service_id: new_version.service_id,
            name: new_version.name,
            description: new_version.description,
            created_at: new_version.created_at,
            deleted_at: None,
        };
        state.versions.push(version.clone());
        Ok(version)
    }

    async fn soft_delete_version(&self, service_id: i32, version_id: i32) -> AppResult<bool> {
        let mut state = self.lock()?;

        if state.live_service_mut(service_id).is_none() {
            return Err(AppError::service_not_found_by_id(service_id));
        }

        let Some(version) = state
            .versions
            .iter_mut()
            .find(|v| v.id == version_id && v.service_id == service_id && v.is_live())
        else {
            return Ok(false);
        };
        version.deleted_at = Some(current_timestamp());

        if let Some(service) = state.live_service_mut(service_id) {
            service.version_count -= 1;
        }
        Ok(true)
    }

    async fn soft_delete_service(&self, service_id: i32) -> AppResult<usize> {
        let mut state = self.lock()?;
        let now = current_timestamp();

        let mut versions_deleted = 0;
        for version in state
            .versions
            .iter_mut()
            .filter(|v| v.service_id == service_id && v.is_live())
        {
            version.deleted_at = Some(now);
            versions_deleted += 1;
        }

        if let Some(service) = state.live_service_mut(service_id) {
            service.deleted_at = Some(now);
        }
        Ok(versions_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(names: &[&str]) -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        for name in names {
            store
                .insert_service(NewService::new(*name, format!("{} service", name)))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_live_service_names_are_unique() {
        let store = seeded(&["payments"]).await;
        let err = store
            .insert_service(NewService::new("payments", "again"))
            .await
            .unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_list_services_orders_and_pages() {
        let store = seeded(&["c", "a", "b"]).await;
        let filter = ServiceFilter::default();

        let page = store
            .list_services(&filter, SortOrder::Asc, PageRequest::new(1, 2))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let page = store
            .list_services(&filter, SortOrder::Desc, PageRequest::new(2, 2))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a"]);
    }

    #[tokio::test]
    async fn test_filters_are_case_insensitive() {
        let store = seeded(&["Payments", "billing"]).await;
        let filter = ServiceFilter::new(Some("PAY".to_string()), None);
        assert_eq!(store.count_services(&filter).await.unwrap(), 1);

        let filter = ServiceFilter::new(None, Some("SERVICE".to_string()));
        assert_eq!(store.count_services(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_version_insert_and_delete_adjust_counter() {
        let store = seeded(&["payments"]).await;
        let service = store.find_service_by_name("payments").await.unwrap().unwrap();

        let version = store
            .insert_version(&service, NewVersion::new(service.id, "v1", "first"))
            .await
            .unwrap();
        let service = store.find_service_by_id(service.id).await.unwrap().unwrap();
        assert_eq!(service.version_count, 1);

        assert!(store.soft_delete_version(service.id, version.id).await.unwrap());
        assert!(!store.soft_delete_version(service.id, version.id).await.unwrap());
        let service = store.find_service_by_id(service.id).await.unwrap().unwrap();
        assert_eq!(service.version_count, 0);
    }

    #[tokio::test]
    async fn test_soft_delete_service_keeps_rows() {
        let store = seeded(&["payments"]).await;
        let service = store.find_service_by_name("payments").await.unwrap().unwrap();
        for name in ["v1", "v2"] {
            store
                .insert_version(&service, NewVersion::new(service.id, name, ""))
                .await
                .unwrap();
        }

        assert_eq!(store.soft_delete_service(service.id).await.unwrap(), 2);
        assert!(store.find_service_by_name("payments").await.unwrap().is_none());

        assert_eq!(store.all_services().unwrap().len(), 1);
        let versions = store.all_versions().unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions.iter().all(|v| !v.is_live()));
    }

    #[tokio::test]
    async fn test_version_writes_against_a_deleted_service_fail() {
        let store = seeded(&["payments"]).await;
        let stale = store.find_service_by_name("payments").await.unwrap().unwrap();
        let version = store
            .insert_version(&stale, NewVersion::new(stale.id, "v1", ""))
            .await
            .unwrap();
        store.soft_delete_service(stale.id).await.unwrap();

        let err = store
            .insert_version(&stale, NewVersion::new(stale.id, "v2", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let err = store.soft_delete_version(stale.id, version.id).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let versions = store.all_versions().unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions.iter().all(|v| !v.is_live()));
        assert_eq!(store.all_services().unwrap()[0].version_count, 1);
    }
}
