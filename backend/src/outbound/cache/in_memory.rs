//! Process-local roster cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::OnCallRoster;
use crate::domain::ports::{CacheEntry, CacheKey, RosterCache, RosterCacheError};

fn poisoned() -> RosterCacheError {
    RosterCacheError::backend("in-memory roster cache lock poisoned")
}

/// [`RosterCache`] holding entries in a `RwLock<HashMap>`.
///
/// Expired entries are dropped lazily on the next read of their key.
#[derive(Clone)]
pub struct InMemoryRosterCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRosterCache {
    /// Empty cache judging expiry by `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RosterCache for InMemoryRosterCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<OnCallRoster>, RosterCacheError> {
        let now = self.clock.utc();
        let live = {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_expired(now) => None,
                Some(entry) => Some(entry.roster.clone()),
            }
        };
        if live.is_none() {
            let mut entries = self.entries.write().map_err(|_| poisoned())?;
            if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
                entries.remove(key);
            }
        }
        Ok(live)
    }

    async fn set(
        &self,
        key: &CacheKey,
        roster: &OnCallRoster,
        ttl: Duration,
    ) -> Result<(), RosterCacheError> {
        let entry = CacheEntry::new(key.clone(), roster.clone(), self.clock.utc(), ttl);
        self.entries
            .write()
            .map_err(|_| poisoned())?
            .insert(key.clone(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<(), RosterCacheError> {
        self.entries.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}
