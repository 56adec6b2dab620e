//! Write side of the catalog.
//!
//! Every operation that touches more than one row delegates to a single
//! atomic store call, so `version_count` never drifts from the number of
//! live versions.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewService, NewVersion, Service, ServiceChanges, Version};
use crate::repositories::CatalogStore;

/// Mutation engine over the injected catalog store.
#[derive(Clone)]
pub struct CatalogMutationService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogMutationService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Creates a live service with no versions.
    ///
    /// Name uniqueness is left to the store; a clash surfaces as
    /// `StoreFailure`.
    pub async fn create_service(&self, name: &str, description: &str) -> AppResult<Service> {
        let service = self
            .store
            .insert_service(NewService::new(name, description))
            .await?;

        tracing::info!(service_id = service.id, service = %service.name, "Service created");
        Ok(service)
    }

    /// Adds a version to the live service `service_name`.
    pub async fn create_version(
        &self,
        service_name: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Version> {
        let service = self.live_service(service_name).await?;

        let version = self
            .store
            .insert_version(&service, NewVersion::new(service.id, name, description))
            .await?;

        tracing::info!(
            service = %service.name,
            version = %version.name,
            version_count = service.version_count + 1,
            "Version created"
        );
        Ok(version)
    }

    /// Soft-deletes the service along with all of its live versions.
    pub async fn delete_service(&self, service_name: &str) -> AppResult<()> {
        let service = self.live_service(service_name).await?;

        let versions_deleted = self.store.soft_delete_service(service.id).await?;

        tracing::info!(
            service_id = service.id,
            service = %service.name,
            versions_deleted,
            "Service deleted"
        );
        Ok(())
    }

    /// Soft-deletes one live version of a live service.
    pub async fn delete_version(&self, service_name: &str, version_name: &str) -> AppResult<()> {
        let service = self.live_service(service_name).await?;

        let version = self
            .store
            .find_version(service.id, version_name)
            .await?
            .ok_or_else(|| AppError::version_not_found(&service.name, version_name))?;

        // A concurrent delete may have won between the lookup and the write.
        if !self.store.soft_delete_version(service.id, version.id).await? {
            return Err(AppError::version_not_found(&service.name, version_name));
        }

        tracing::info!(
            service = %service.name,
            version = %version.name,
            version_count = service.version_count - 1,
            "Version deleted"
        );
        Ok(())
    }

    /// Applies a partial update to the live service `id`.
    ///
    /// Absent or empty fields keep their stored value.
    pub async fn update_service(&self, id: i32, changes: ServiceChanges) -> AppResult<Service> {
        if changes.is_empty() {
            return self
                .store
                .find_service_by_id(id)
                .await?
                .ok_or_else(|| AppError::service_not_found_by_id(id));
        }

        let service = self
            .store
            .update_service(id, changes)
            .await?
            .ok_or_else(|| AppError::service_not_found_by_id(id))?;

        tracing::info!(service_id = service.id, service = %service.name, "Service updated");
        Ok(service)
    }

    async fn live_service(&self, name: &str) -> AppResult<Service> {
        self.store
            .find_service_by_name(name)
            .await?
            .ok_or_else(|| AppError::service_not_found_by_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceFilter, SortOrder};
    use crate::repositories::InMemoryCatalogStore;
    use crate::services::CatalogQueryService;

    struct Fixture {
        mutation: CatalogMutationService,
        query: CatalogQueryService,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        Fixture {
            mutation: CatalogMutationService::new(store.clone()),
            query: CatalogQueryService::new(store, 2),
        }
    }

    impl Fixture {
        async fn version_count(&self, service: &str) -> i32 {
            self.query
                .get_service_with_versions(1, service)
                .await
                .unwrap()
                .service
                .version_count
        }

        async fn all_version_names(&self, service: &str) -> Vec<String> {
            let mut names = Vec::new();
            let mut page = 1;
            loop {
                let result = self.query.get_service_with_versions(page, service).await.unwrap();
                names.extend(result.versions.into_iter().map(|v| v.name));
                if page >= result.total_pages {
                    return names;
                }
                page += 1;
            }
        }
    }

    #[tokio::test]
    async fn test_create_service_starts_empty() {
        let f = fixture();
        let service = f.mutation.create_service("payments", "Payments API").await.unwrap();
        assert_eq!(service.version_count, 0);
        assert!(service.is_live());
    }

    #[tokio::test]
    async fn test_duplicate_service_name_is_store_failure() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        let err = f.mutation.create_service("payments", "").await.unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_create_version_increments_counter_once() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        assert_eq!(f.version_count("payments").await, 0);

        for (i, name) in ["v1", "v2", "v3"].iter().enumerate() {
            f.mutation.create_version("payments", name, "").await.unwrap();
            assert_eq!(f.version_count("payments").await, i as i32 + 1);
        }
        assert_eq!(f.all_version_names("payments").await, ["v1", "v2", "v3"]);
    }

    #[tokio::test]
    async fn test_create_version_unknown_service() {
        let f = fixture();
        let err = f
            .mutation
            .create_version("missing", "v1", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_version_within_service() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        f.mutation.create_service("billing", "").await.unwrap();

        f.mutation.create_version("payments", "v1", "").await.unwrap();
        let err = f
            .mutation
            .create_version("payments", "v1", "")
            .await
            .unwrap_err();
        match err {
            AppError::DuplicateVersion { service, version } => {
                assert_eq!(service, "payments");
                assert_eq!(version, "v1");
            }
            other => panic!("Expected DuplicateVersion, got {:?}", other),
        }
        assert_eq!(f.version_count("payments").await, 1);

        // Same name under a different service is fine
        f.mutation.create_version("billing", "v1", "").await.unwrap();
        assert_eq!(f.version_count("billing").await, 1);
    }

    #[tokio::test]
    async fn test_delete_version_decrements_counter() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        f.mutation.create_version("payments", "v1", "").await.unwrap();
        f.mutation.create_version("payments", "v2", "").await.unwrap();

        f.mutation.delete_version("payments", "v1").await.unwrap();

        assert_eq!(f.version_count("payments").await, 1);
        assert_eq!(f.all_version_names("payments").await, ["v2"]);

        let err = f.mutation.delete_version("payments", "v1").await.unwrap_err();
        assert!(matches!(err, AppError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_deleted_version_name_can_be_reused() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        f.mutation.create_version("payments", "v1", "old").await.unwrap();
        f.mutation.delete_version("payments", "v1").await.unwrap();

        let version = f
            .mutation
            .create_version("payments", "v1", "new")
            .await
            .unwrap();
        assert_eq!(version.description, "new");
        assert_eq!(f.version_count("payments").await, 1);
    }

    #[tokio::test]
    async fn test_delete_version_not_found_cases() {
        let f = fixture();
        let err = f.mutation.delete_version("missing", "v1").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        f.mutation.create_service("payments", "").await.unwrap();
        let err = f.mutation.delete_version("payments", "v9").await.unwrap_err();
        assert!(matches!(err, AppError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_service_cascades() {
        let f = fixture();
        f.mutation.create_service("payments", "").await.unwrap();
        f.mutation.create_service("billing", "").await.unwrap();
        f.mutation.create_version("payments", "v1", "").await.unwrap();
        f.mutation.create_version("payments", "v2", "").await.unwrap();

        f.mutation.delete_service("payments").await.unwrap();

        let listing = f
            .query
            .list_services(1, SortOrder::Asc, &ServiceFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = listing.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["billing"]);
        assert_eq!(listing.total_records, 1);

        let err = f
            .query
            .get_service_with_versions(1, "payments")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let err = f.mutation.delete_version("payments", "v1").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let err = f.mutation.delete_service("payments").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_deleted_service_name_can_be_reused() {
        let f = fixture();
        f.mutation.create_service("payments", "old").await.unwrap();
        f.mutation.create_version("payments", "v1", "").await.unwrap();
        f.mutation.delete_service("payments").await.unwrap();

        let service = f.mutation.create_service("payments", "new").await.unwrap();
        assert_eq!(service.description, "new");
        assert_eq!(f.version_count("payments").await, 0);
        assert!(f.all_version_names("payments").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_with_empty_name_keeps_name() {
        let f = fixture();
        let service = f.mutation.create_service("payments", "old").await.unwrap();

        let changes = ServiceChanges::from_request(Some(String::new()), Some("new".to_string()));
        let updated = f.mutation.update_service(service.id, changes).await.unwrap();

        assert_eq!(updated.name, "payments");
        assert_ne!(updated.name, "");
        assert_eq!(updated.description, "new");
    }

    #[tokio::test]
    async fn test_update_with_nothing_to_change() {
        let f = fixture();
        let service = f.mutation.create_service("payments", "desc").await.unwrap();

        let changes = ServiceChanges::from_request(None, Some(String::new()));
        let unchanged = f.mutation.update_service(service.id, changes).await.unwrap();
        assert_eq!(unchanged.name, "payments");
        assert_eq!(unchanged.description, "desc");
    }

    #[tokio::test]
    async fn test_update_renames_service() {
        let f = fixture();
        let service = f.mutation.create_service("payments", "").await.unwrap();

        let changes = ServiceChanges::from_request(Some("payments-v2".to_string()), None);
        f.mutation.update_service(service.id, changes).await.unwrap();

        assert!(f.query.get_service_with_versions(1, "payments-v2").await.is_ok());
        assert!(f.query.get_service_with_versions(1, "payments").await.is_err());
    }

    #[tokio::test]
    async fn test_update_unknown_or_deleted_service() {
        let f = fixture();
        let changes = ServiceChanges::from_request(Some("x".to_string()), None);
        let err = f.mutation.update_service(42, changes.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let service = f.mutation.create_service("payments", "").await.unwrap();
        f.mutation.delete_service("payments").await.unwrap();
        let err = f.mutation.update_service(service.id, changes).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));

        let err = f
            .mutation
            .update_service(service.id, ServiceChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound { .. }));
    }
}
