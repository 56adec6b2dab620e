use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// Version row as stored in the `versions` table.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Version {
    pub id: i32,
    pub service_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Version {
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// NewVersion model for inserting new records
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::versions)]
pub struct NewVersion {
    pub service_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}

impl NewVersion {
    pub fn new(service_id: i32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            service_id,
            name: name.into(),
            description: description.into(),
            created_at: super::current_timestamp(),
        }
    }
}
