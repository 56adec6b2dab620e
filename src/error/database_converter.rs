use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors into catalog errors.
///
/// Every Diesel error becomes a `StoreFailure` tagged with the failing
/// operation, except unique violations the caller explicitly recognises by
/// constraint name (see [`DatabaseErrorConverter::is_unique_violation_of`]).
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to a `StoreFailure` carrying a readable cause.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                let message = info.message();
                let constraint = ConstraintParser::violated_constraint(message, info.constraint_name());
                let cause = match (kind, constraint) {
                    (DatabaseErrorKind::UniqueViolation, Some(name)) => {
                        let detail = info.details().unwrap_or(message);
                        match ConstraintParser::extract_key_value(detail) {
                            Some((key, value)) => format!(
                                "Unique constraint {} violated: ({})=({}) already exists",
                                name, key, value
                            ),
                            None => format!("Unique constraint {} violated: {}", name, message),
                        }
                    }
                    (DatabaseErrorKind::ForeignKeyViolation, Some(name)) => {
                        format!("Foreign key constraint {} violated: {}", name, message)
                    }
                    (DatabaseErrorKind::CheckViolation, Some(name)) => {
                        format!("Check constraint {} violated: {}", name, message)
                    }
                    _ => format!("Database error: {}", message),
                };
                AppError::store(operation, anyhow::Error::msg(cause))
            }
            other => AppError::store(operation, other),
        }
    }

    /// True when `error` is a unique violation of the named constraint.
    pub fn is_unique_violation_of(error: &DieselError, constraint: &str) -> bool {
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ConstraintParser::is_constraint(info.message(), info.constraint_name(), constraint)
            }
            _ => false,
        }
    }
}
