//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`RosterCache`, `OnCallSource`, `BookQuery`, `BookCommands`)
//! are implemented by outbound adapters. Driving ports (`OnCallLookup`,
//! `ServerStatusQuery`) are implemented by domain services and consumed by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod book_repository;
mod cache_key;
mod on_call_lookup;
mod on_call_source;
mod roster_cache;
mod server_status;

#[cfg(test)]
pub use book_repository::{MockBookCommands, MockBookQuery};
pub use book_repository::{BookCommands, BookQuery, BookRepositoryError};
pub use cache_key::{CacheKey, CacheKeyValidationError};
#[cfg(test)]
pub use on_call_lookup::MockOnCallLookup;
pub use on_call_lookup::{OnCallLookup, OnCallLookupError};
#[cfg(test)]
pub use on_call_source::MockOnCallSource;
pub use on_call_source::{OnCallSource, OnCallSourceError};
#[cfg(test)]
pub use roster_cache::MockRosterCache;
pub use roster_cache::{CacheEntry, RosterCache, RosterCacheError};
#[cfg(test)]
pub use server_status::MockServerStatusQuery;
pub use server_status::{ServerStatus, ServerStatusQuery};
