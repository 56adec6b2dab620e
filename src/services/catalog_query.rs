//! Read side of the catalog: paginated service listings and a single
//! service with one page of its versions.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    PageRequest, ServiceFilter, ServicePage, ServiceVersionsPage, SortOrder, total_pages,
};
use crate::repositories::CatalogStore;

/// Query engine over the injected catalog store.
#[derive(Clone)]
pub struct CatalogQueryService {
    store: Arc<dyn CatalogStore>,
    page_size: i64,
}

impl CatalogQueryService {
    pub fn new(store: Arc<dyn CatalogStore>, page_size: i64) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Lists live services matching `filter`, one page at a time.
    ///
    /// Pages below 1 are treated as 1. A page past the last one fails with
    /// `InvalidPage`, except when nothing matches at all, in which case page
    /// 1 comes back empty.
    pub async fn list_services(
        &self,
        page: i64,
        sort: SortOrder,
        filter: &ServiceFilter,
    ) -> AppResult<ServicePage> {
        let total_records = self.store.count_services(filter).await?;
        let total_pages = total_pages(total_records, self.page_size);

        // Nothing to page through: any page number reads as an empty page 1
        let request = if total_pages == 0 {
            PageRequest::new(1, self.page_size)
        } else {
            PageRequest::new(page, self.page_size)
        };

        if total_pages > 0 && request.page > total_pages {
            return Err(AppError::InvalidPage {
                page: request.page,
                total_pages,
            });
        }

        let services = self.store.list_services(filter, sort, request).await?;

        tracing::debug!(
            page = request.page,
            sort = %sort,
            total_records,
            returned = services.len(),
            "Listed services"
        );

        Ok(ServicePage {
            services,
            total_records,
            total_pages,
            current_page: request.page,
        })
    }

    /// Loads the live service called `name` with one page of its live
    /// versions.
    ///
    /// Unlike [`list_services`](Self::list_services), a page past the end is
    /// not an error and simply carries no versions.
    pub async fn get_service_with_versions(
        &self,
        page: i64,
        name: &str,
    ) -> AppResult<ServiceVersionsPage> {
        let request = PageRequest::new(page, self.page_size);

        let total_version_records = self.store.count_versions_by_service_name(name).await?;

        let service = self
            .store
            .find_service_by_name(name)
            .await?
            .ok_or_else(|| AppError::service_not_found_by_name(name))?;

        let versions = self.store.list_versions(service.id, request).await?;

        tracing::debug!(
            service = %service.name,
            page = request.page,
            total_version_records,
            returned = versions.len(),
            "Loaded service with versions"
        );

        Ok(ServiceVersionsPage {
            service,
            versions,
            total_version_records,
            total_pages: total_pages(total_version_records, self.page_size),
            current_page: request.page,
        })
    }
}
