//! Read-through on-call lookup.
//!
//! The facade answers from the roster cache when it can and falls back to
//! the on-call directory on a miss, writing the fetched roster back with the
//! configured TTL. Cache failures never reach the caller: they are logged and
//! treated as misses. Source failures surface only when no roster for the key
//! has been seen by this process; otherwise the last good roster is served.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::deadline::within;
use crate::domain::OnCallRoster;
use crate::domain::ports::{
    CacheKey, OnCallLookup, OnCallLookupError, OnCallSource, OnCallSourceError, RosterCache,
    RosterCacheError,
};

/// Tunables for [`CachedOnCallLookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnCallLookupConfig {
    /// Lifetime of entries written after a miss.
    pub ttl: Duration,
    /// Budget for each individual cache or source call.
    pub operation_timeout: Duration,
}

impl Default for OnCallLookupConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            operation_timeout: Duration::from_secs(2),
        }
    }
}

/// Read-through implementation of [`OnCallLookup`].
pub struct CachedOnCallLookup {
    cache: Arc<dyn RosterCache>,
    source: Arc<dyn OnCallSource>,
    config: OnCallLookupConfig,
    last_known: RwLock<HashMap<CacheKey, OnCallRoster>>,
}

impl CachedOnCallLookup {
    /// Compose the facade from its cache and source.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let lookup = CachedOnCallLookup::new(cache, directory, OnCallLookupConfig::default());
    /// let roster = lookup.resolve(&CacheKey::new("oncall")?).await?;
    /// ```
    pub fn new(
        cache: Arc<dyn RosterCache>,
        source: Arc<dyn OnCallSource>,
        config: OnCallLookupConfig,
    ) -> Self {
        Self {
            cache,
            source,
            config,
            last_known: RwLock::new(HashMap::new()),
        }
    }

    async fn read_cache(&self, key: &CacheKey) -> Option<OnCallRoster> {
        let outcome = within(self.config.operation_timeout, self.cache.get(key), || {
            RosterCacheError::timeout("get")
        })
        .await;
        match outcome {
            Ok(hit) => hit,
            Err(error) => {
                warn!(%key, %error, "roster cache read failed; treating as miss");
                None
            }
        }
    }

    async fn write_cache(&self, key: &CacheKey, roster: &OnCallRoster) {
        let outcome = within(
            self.config.operation_timeout,
            self.cache.set(key, roster, self.config.ttl),
            || RosterCacheError::timeout("set"),
        )
        .await;
        if let Err(error) = outcome {
            warn!(%key, %error, "roster cache write failed after source fetch");
        }
    }

    async fn fetch_source(&self, key: &CacheKey) -> Result<OnCallRoster, OnCallSourceError> {
        within(self.config.operation_timeout, self.source.fetch(key), || {
            OnCallSourceError::timeout(format!(
                "no answer within {}ms",
                self.config.operation_timeout.as_millis()
            ))
        })
        .await
    }

    fn remember(&self, key: &CacheKey, roster: &OnCallRoster) {
        self.last_known
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), roster.clone());
    }

    fn last_known(&self, key: &CacheKey) -> Option<OnCallRoster> {
        self.last_known
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl OnCallLookup for CachedOnCallLookup {
    async fn resolve(&self, key: &CacheKey) -> Result<OnCallRoster, OnCallLookupError> {
        if let Some(roster) = self.read_cache(key).await {
            debug!(%key, "roster cache hit");
            return Ok(roster);
        }

        match self.fetch_source(key).await {
            Ok(roster) => {
                self.write_cache(key, &roster).await;
                self.remember(key, &roster);
                Ok(roster)
            }
            Err(error) => match self.last_known(key) {
                Some(stale) => {
                    warn!(
                        %key,
                        %error,
                        fetched_at = %stale.fetched_at(),
                        "on-call source failed; serving last known roster"
                    );
                    Ok(stale)
                }
                None => {
                    warn!(%key, %error, "on-call source failed with nothing cached");
                    Err(OnCallLookupError::lookup_failed(
                        key.as_str(),
                        error.to_string(),
                    ))
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "cached_on_call_lookup_tests.rs"]
mod tests;
