//! Roster cache adapters.
//!
//! - [`RedisRosterCache`]: shared cache used in production, pooled through
//!   `bb8-redis`, JSON payloads, namespaced keys and jittered TTLs.
//! - [`InMemoryRosterCache`]: process-local store for tests and development
//!   servers.
//!
//! Both store whole [`crate::domain::ports::CacheEntry`] values and re-check
//! the entry's expiry against the clock on every read.

mod in_memory;
mod redis;

pub use in_memory::InMemoryRosterCache;
pub use redis::{RedisCacheConfig, RedisRosterCache, jittered_ttl, namespaced_key};
