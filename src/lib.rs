//! Service Catalog Library
//!
//! Catalog of services and their versions, served over a JSON HTTP API and
//! backed by PostgreSQL.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
