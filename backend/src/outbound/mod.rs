//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: Redis and in-process roster caches
//! - **directory**: HTTP client for the on-call directory
//! - **persistence**: PostgreSQL book inventory using Diesel ORM
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod directory;
pub mod persistence;
