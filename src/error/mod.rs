mod app_error;
pub mod constraint_parser;
mod database_converter;

pub use app_error::{AppError, AppResult, ServiceLookup, ValidationFieldError};
pub use constraint_parser::ConstraintParser;
pub use database_converter::DatabaseErrorConverter;
