mod catalog;
mod service;
mod version;

pub use catalog::{PageRequest, ServiceFilter, ServicePage, ServiceVersionsPage, SortOrder, total_pages};
pub use service::{NewService, Service, ServiceChanges};
pub use version::{NewVersion, Version};

use jiff_diesel::ToDiesel;

/// Current wall-clock time in the representation stored by diesel.
pub fn current_timestamp() -> jiff_diesel::Timestamp {
    jiff::Timestamp::now().to_diesel()
}
