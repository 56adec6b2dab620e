use std::fmt;

use crate::error::DatabaseErrorConverter;
use thiserror::Error;

/// How a service was looked up when it could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceLookup {
    Name(String),
    Id(i32),
}

impl fmt::Display for ServiceLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceLookup::Name(name) => write!(f, "name={}", name),
            ServiceLookup::Id(id) => write!(f, "id={}", id),
        }
    }
}

/// Application-wide error type.
///
/// The first five variants are the catalog's classified outcomes and are
/// always matched by tag. The remaining variants belong to the request and
/// process surfaces around the catalog.
#[derive(Error, Debug)]
pub enum AppError {
    /// No live service matches the lookup
    #[error("service not found: {lookup}")]
    ServiceNotFound { lookup: ServiceLookup },

    /// No live version with this name exists under the service
    #[error("version not found: {service}/{version}")]
    VersionNotFound { service: String, version: String },

    /// Requested page lies beyond the last page of results
    #[error("invalid page number {page}: only {total_pages} page(s) available")]
    InvalidPage { page: i64, total_pages: i64 },

    /// A live version with the same name already exists under the service
    #[error("version with the same name already exists for this service: {service}/{version}")]
    DuplicateVersion { service: String, version: String },

    /// Any other persistence-layer failure
    #[error("store operation failed: {operation}")]
    StoreFailure {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn service_not_found_by_name(name: impl Into<String>) -> Self {
        AppError::ServiceNotFound {
            lookup: ServiceLookup::Name(name.into()),
        }
    }

    pub fn service_not_found_by_id(id: i32) -> Self {
        AppError::ServiceNotFound {
            lookup: ServiceLookup::Id(id),
        }
    }

    pub fn version_not_found(service: impl Into<String>, version: impl Into<String>) -> Self {
        AppError::VersionNotFound {
            service: service.into(),
            version: version.into(),
        }
    }

    /// Wraps a failure to obtain a pooled connection.
    pub fn pool<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::StoreFailure {
            operation: "acquire connection".to_string(),
            source: anyhow::Error::from(error),
        }
    }

    /// Wraps any other store error under the given operation name.
    pub fn store(operation: &str, source: impl Into<anyhow::Error>) -> Self {
        AppError::StoreFailure {
            operation: operation.to_string(),
            source: source.into(),
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::StoreFailure { .. })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        match error {
            crate::config::error::ConfigError::ValidationError { field, message } => {
                AppError::Validation {
                    field,
                    reason: message,
                }
            }
            other => AppError::Configuration {
                key: "settings".to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationFieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        match fields.into_iter().next() {
            Some(first) => AppError::Validation {
                field: first.field,
                reason: first.message,
            },
            None => AppError::BadRequest {
                message: "request validation failed".to_string(),
            },
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    #[test]
    fn test_not_found_messages_carry_context() {
        let err = AppError::service_not_found_by_name("payments");
        assert_eq!(err.to_string(), "service not found: name=payments");

        let err = AppError::service_not_found_by_id(7);
        assert_eq!(err.to_string(), "service not found: id=7");

        let err = AppError::version_not_found("payments", "v2");
        assert_eq!(err.to_string(), "version not found: payments/v2");
    }

    #[test]
    fn test_store_failure_classification() {
        let err = AppError::store("count services", anyhow::anyhow!("connection reset"));
        assert!(err.is_store_failure());
        assert!(!AppError::service_not_found_by_id(1).is_store_failure());
    }

    #[test]
    fn test_from_validation_errors() {
        let payload = Payload {
            name: String::new(),
        };
        let err = AppError::from(payload.validate().unwrap_err());
        match err {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "name");
                assert_eq!(reason, "name must not be empty");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
