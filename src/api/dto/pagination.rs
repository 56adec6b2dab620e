//! Query-string DTOs for the paginated catalog endpoints.
//!
//! Every field arrives as a raw string so that malformed values fall back to
//! defaults instead of rejecting the request.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::{ServiceFilter, SortOrder};

/// Query parameters for listing services.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListServicesParams {
    /// Page number (1-based); missing, non-numeric or values below 1 mean 1
    #[param(value_type = Option<i64>, example = 1)]
    pub page: Option<String>,

    /// Sort direction on service name, `ASC` or `DESC` (case-insensitive)
    #[param(example = "ASC")]
    pub sort: Option<String>,

    /// Case-insensitive substring match on the service name
    pub name: Option<String>,

    /// Case-insensitive substring match on the service description
    pub description: Option<String>,
}

impl ListServicesParams {
    pub fn page(&self) -> i64 {
        parse_page(self.page.as_deref())
    }

    pub fn sort(&self) -> SortOrder {
        SortOrder::parse_lenient(self.sort.as_deref())
    }

    pub fn filter(&self) -> ServiceFilter {
        ServiceFilter::new(self.name.clone(), self.description.clone())
    }
}

/// Query parameters for paging through a service's versions.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based); missing, non-numeric or values below 1 mean 1
    #[param(value_type = Option<i64>, example = 1)]
    pub page: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        parse_page(self.page.as_deref())
    }
}

fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}
