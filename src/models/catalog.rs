//! Query-side types shared by the catalog engines and the stores.

use std::fmt;

use super::{Service, Version};

/// Sort direction applied to service names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses a raw `sort` query value.
    ///
    /// Matching is case-insensitive; anything other than `ASC` or `DESC`
    /// falls back to ascending order.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("DESC") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive substring filters over services.
///
/// Both filters are combined with AND. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ServiceFilter {
    pub fn new(name: Option<String>, description: Option<String>) -> Self {
        Self {
            name: name.filter(|s| !s.is_empty()),
            description: description.filter(|s| !s.is_empty()),
        }
    }

    /// Builds an ILIKE pattern matching `needle` anywhere, with LIKE
    /// wildcards in the needle escaped so they match literally.
    pub fn like_pattern(needle: &str) -> String {
        let mut pattern = String::with_capacity(needle.len() + 2);
        pattern.push('%');
        for ch in needle.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    /// In-process equivalent of the SQL filter.
    pub fn matches(&self, service: &Service) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        self.name
            .as_deref()
            .is_none_or(|needle| contains(&service.name, needle))
            && self
                .description
                .as_deref()
                .is_none_or(|needle| contains(&service.description, needle))
    }
}

/// A 1-based page of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Creates a page request, clamping pages below 1 up to 1.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Rows to skip; saturates so absurd page numbers read past the end
    /// instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// `ceil(total / page_size)`, or 0 when there is nothing to page through.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

/// One page of live services.
#[derive(Debug, Clone)]
pub struct ServicePage {
    pub services: Vec<Service>,
    pub total_records: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// A live service with one page of its live versions attached.
#[derive(Debug, Clone)]
pub struct ServiceVersionsPage {
    pub service: Service,
    pub versions: Vec<Version>,
    pub total_version_records: i64,
    pub total_pages: i64,
    pub current_page: i64,
}
