//! Port for the shared roster cache.
//!
//! Adapters store whole [`CacheEntry`] values and must never hand back an
//! entry whose expiry has passed; expired entries read as absent.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CacheKey, define_port_error};
use crate::domain::OnCallRoster;

define_port_error! {
    /// Errors surfaced by roster cache adapters. All of them are transient.
    pub enum RosterCacheError {
        /// Backend unreachable or the command failed.
        Backend { message: String } => "roster cache backend failure: {message}",
        /// Stored payload could not be encoded or decoded.
        Serialization { message: String } => "roster cache serialisation failed: {message}",
        /// The operation exceeded its time budget.
        Timeout { operation: String } => "roster cache {operation} timed out",
    }
}

/// One cached roster together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Key the roster is stored under.
    pub key: CacheKey,
    /// Cached roster.
    pub roster: OnCallRoster,
    /// Instant after which the entry is a miss.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry expiring `ttl` after `now`.
    ///
    /// A TTL too large for `chrono` saturates to the maximum representable
    /// instant.
    pub fn new(key: CacheKey, roster: OnCallRoster, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key,
            roster,
            expires_at,
        }
    }

    /// Whether the entry must be treated as absent at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Return the roster only while the entry is live.
    pub fn into_live_roster(self, now: DateTime<Utc>) -> Option<OnCallRoster> {
        (!self.is_expired(now)).then_some(self.roster)
    }
}

/// Key-value store holding on-call rosters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterCache: Send + Sync {
    /// Read the live roster for `key`, or `None` on a miss or expired entry.
    async fn get(&self, key: &CacheKey) -> Result<Option<OnCallRoster>, RosterCacheError>;

    /// Replace the entry for `key`, expiring after `ttl`.
    async fn set(
        &self,
        key: &CacheKey,
        roster: &OnCallRoster,
        ttl: Duration,
    ) -> Result<(), RosterCacheError>;

    /// Drop the entry for `key`. Removing an absent key succeeds.
    async fn invalidate(&self, key: &CacheKey) -> Result<(), RosterCacheError>;
}
