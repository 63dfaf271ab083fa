//! PostgreSQL persistence adapters using Diesel with `diesel-async`.
//!
//! Row structs and table definitions stay private to this module;
//! repositories translate them into domain types and map every database
//! failure to a port error.

mod diesel_book_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_book_repository::DieselBookRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
