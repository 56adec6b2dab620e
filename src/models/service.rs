use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// Service row as stored in the `services` table.
///
/// `version_count` is a denormalized counter of the live versions owned by
/// this service. It is only ever adjusted by the store's version insert and
/// version delete units of work.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub version_count: i32,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Service {
    /// A service is live until its deletion marker is set.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// NewService model for inserting new records
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::services)]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub version_count: i32,
    pub created_at: Timestamp,
}

impl NewService {
    /// Builds a live service with no versions, stamped with the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version_count: 0,
            created_at: super::current_timestamp(),
        }
    }
}

/// Partial update of a service. `None` fields are left untouched.
#[derive(Debug, AsChangeset, Clone, Default, PartialEq, Eq)]
#[diesel(table_name = crate::schema::services)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ServiceChanges {
    /// Builds a changeset where empty strings mean "no change".
    ///
    /// There is no way to clear a field through this changeset: an empty
    /// name or description is indistinguishable from an absent one.
    pub fn from_request(name: Option<String>, description: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            description: description.filter(|d| !d.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
