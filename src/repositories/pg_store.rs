//! PostgreSQL implementation of [`CatalogStore`].

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::constraint_parser::VERSION_NAME_CONSTRAINT;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{
    NewService, NewVersion, PageRequest, Service, ServiceChanges, ServiceFilter, SortOrder,
    Version, current_timestamp,
};
use crate::repositories::CatalogStore;
use crate::schema::{services, versions};

/// Catalog store backed by the async connection pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: AsyncDbPool,
}

impl PgCatalogStore {
    /// Creates a new PgCatalogStore with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    fn db_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> AppError {
        move |e| DatabaseErrorConverter::convert_diesel_error(e, operation)
    }

    /// Live services narrowed by the optional substring filters.
    fn live_services_matching(filter: &ServiceFilter) -> services::BoxedQuery<'static, Pg> {
        let mut query = services::table
            .filter(services::deleted_at.is_null())
            .into_boxed();

        if let Some(name) = filter.name.as_deref() {
            query = query.filter(services::name.ilike(ServiceFilter::like_pattern(name)));
        }
        if let Some(description) = filter.description.as_deref() {
            query = query.filter(
                services::description.ilike(ServiceFilter::like_pattern(description)),
            );
        }

        query
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(Self::db_error("ping"))
    }

    async fn count_services(&self, filter: &ServiceFilter) -> AppResult<i64> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        Self::live_services_matching(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(Self::db_error("count services"))
    }

    async fn list_services(
        &self,
        filter: &ServiceFilter,
        sort: SortOrder,
        page: PageRequest,
    ) -> AppResult<Vec<Service>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        let query = Self::live_services_matching(filter);
        let query = match sort {
            SortOrder::Asc => query.order((services::name.asc(), services::id.asc())),
            SortOrder::Desc => query.order((services::name.desc(), services::id.desc())),
        };

        query
            .offset(page.offset())
            .limit(page.limit())
            .select(Service::as_select())
            .load(&mut conn)
            .await
            .map_err(Self::db_error("list services"))
    }

    async fn find_service_by_name(&self, name: &str) -> AppResult<Option<Service>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        services::table
            .filter(services::name.eq(name))
            .filter(services::deleted_at.is_null())
            .select(Service::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Self::db_error("find service by name"))
    }

    async fn find_service_by_id(&self, id: i32) -> AppResult<Option<Service>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        services::table
            .filter(services::id.eq(id))
            .filter(services::deleted_at.is_null())
            .select(Service::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Self::db_error("find service by id"))
    }

    async fn insert_service(&self, new_service: NewService) -> AppResult<Service> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        diesel::insert_into(services::table)
            .values(&new_service)
            .returning(Service::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(Self::db_error("insert service"))
    }

    async fn update_service(
        &self,
        id: i32,
        changes: ServiceChanges,
    ) -> AppResult<Option<Service>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        diesel::update(
            services::table
                .filter(services::id.eq(id))
                .filter(services::deleted_at.is_null()),
        )
        .set(&changes)
        .returning(Service::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(Self::db_error("update service"))
    }

    async fn count_versions_by_service_name(&self, name: &str) -> AppResult<i64> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        versions::table
            .inner_join(services::table)
            .filter(services::name.eq(name))
            .filter(services::deleted_at.is_null())
            .filter(versions::deleted_at.is_null())
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(Self::db_error("count versions"))
    }

    async fn list_versions(&self, service_id: i32, page: PageRequest) -> AppResult<Vec<Version>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        versions::table
            .filter(versions::service_id.eq(service_id))
            .filter(versions::deleted_at.is_null())
            .order(versions::id.asc())
            .offset(page.offset())
            .limit(page.limit())
            .select(Version::as_select())
            .load(&mut conn)
            .await
            .map_err(Self::db_error("list versions"))
    }

    async fn find_version(&self, service_id: i32, name: &str) -> AppResult<Option<Version>> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;

        versions::table
            .filter(versions::service_id.eq(service_id))
            .filter(versions::name.eq(name))
            .filter(versions::deleted_at.is_null())
            .select(Version::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Self::db_error("find version"))
    }

    async fn insert_version(
        &self,
        service: &Service,
        new_version: NewVersion,
    ) -> AppResult<Version> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;
        let service_id = service.id;
        let service_name = service.name.clone();

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                // Bumping the counter first locks the service row, so a
                // concurrent service delete either lands before (and this
                // finds no live row) or waits for this unit to commit.
                let owners = diesel::update(
                    services::table
                        .filter(services::id.eq(service_id))
                        .filter(services::deleted_at.is_null()),
                )
                .set(services::version_count.eq(services::version_count + 1))
                .execute(conn)
                .await
                .map_err(Self::db_error("increment version count"))?;

                if owners == 0 {
                    return Err(AppError::service_not_found_by_name(service_name));
                }

                diesel::insert_into(versions::table)
                    .values(&new_version)
                    .returning(Version::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(|e| {
                        if DatabaseErrorConverter::is_unique_violation_of(
                            &e,
                            VERSION_NAME_CONSTRAINT,
                        ) {
                            AppError::DuplicateVersion {
                                service: service_name,
                                version: new_version.name.clone(),
                            }
                        } else {
                            DatabaseErrorConverter::convert_diesel_error(e, "insert version")
                        }
                    })
            }
            .scope_boxed()
        })
        .await
    }

    async fn soft_delete_version(&self, service_id: i32, version_id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;
        let now = current_timestamp();

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let deleted = diesel::update(
                    versions::table
                        .filter(versions::id.eq(version_id))
                        .filter(versions::service_id.eq(service_id))
                        .filter(versions::deleted_at.is_null()),
                )
                .set(versions::deleted_at.eq(Some(now)))
                .execute(conn)
                .await
                .map_err(Self::db_error("soft delete version"))?;

                if deleted == 0 {
                    return Ok(false);
                }

                let owners = diesel::update(
                    services::table
                        .filter(services::id.eq(service_id))
                        .filter(services::deleted_at.is_null()),
                )
                .set(services::version_count.eq(services::version_count - 1))
                .execute(conn)
                .await
                .map_err(Self::db_error("decrement version count"))?;

                if owners == 0 {
                    return Err(AppError::service_not_found_by_id(service_id));
                }

                Ok(true)
            }
            .scope_boxed()
        })
        .await
    }

    async fn soft_delete_service(&self, service_id: i32) -> AppResult<usize> {
        let mut conn = self.pool.get().await.map_err(AppError::pool)?;
        let now = current_timestamp();

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let versions_deleted = diesel::update(
                    versions::table
                        .filter(versions::service_id.eq(service_id))
                        .filter(versions::deleted_at.is_null()),
                )
                .set(versions::deleted_at.eq(Some(now)))
                .execute(conn)
                .await
                .map_err(Self::db_error("soft delete versions"))?;

                diesel::update(
                    services::table
                        .filter(services::id.eq(service_id))
                        .filter(services::deleted_at.is_null()),
                )
                .set(services::deleted_at.eq(Some(now)))
                .execute(conn)
                .await
                .map_err(Self::db_error("soft delete service"))?;

                Ok(versions_deleted)
            }
            .scope_boxed()
        })
        .await
    }
}
