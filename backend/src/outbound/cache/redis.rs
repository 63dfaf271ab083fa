//! Redis-backed roster cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::{self, AsyncCommands};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::OnCallRoster;
use crate::domain::ports::{CacheEntry, CacheKey, RosterCache, RosterCacheError};

const KEY_PREFIX: &str = "oncall:v1:";

/// Share of the TTL that jitter may shave off, in percent.
const MAX_JITTER_PERCENT: u64 = 10;

/// Connection settings for [`RedisRosterCache`].
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisCacheConfig {
    /// Defaults to 8 pooled connections and a 2 second checkout timeout.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 8,
            connection_timeout: Duration::from_secs(2),
        }
    }

    /// Override the pool size.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Override how long a checkout may wait.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Storage key for `key`: `oncall:v1:<sha256 hex>`.
///
/// Hashing keeps arbitrary roster names within Redis key conventions, and the
/// version segment lets a payload format change abandon old entries.
///
/// # Examples
/// ```
/// use library_api::domain::ports::CacheKey;
/// use library_api::outbound::cache::namespaced_key;
///
/// let key = CacheKey::new("oncall").expect("valid key");
/// assert!(namespaced_key(&key).starts_with("oncall:v1:"));
/// assert_eq!(namespaced_key(&key).len(), "oncall:v1:".len() + 64);
/// ```
pub fn namespaced_key(key: &CacheKey) -> String {
    let digest = Sha256::digest(key.as_str().as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}

/// Shorten `ttl` by a random amount of at most a tenth of it.
///
/// Spreading expiries stops every primed key from lapsing in the same
/// instant. The result never exceeds `ttl`.
pub fn jittered_ttl(ttl: Duration, rng: &mut impl Rng) -> Duration {
    let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    let max_jitter = ttl_ms / 100 * MAX_JITTER_PERCENT;
    if max_jitter == 0 {
        return ttl;
    }
    ttl - Duration::from_millis(rng.gen_range(0..=max_jitter))
}

fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn encode_entry(entry: &CacheEntry) -> Result<String, RosterCacheError> {
    serde_json::to_string(entry).map_err(|err| RosterCacheError::serialization(err.to_string()))
}

fn decode_entry(
    key: &CacheKey,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<Option<OnCallRoster>, RosterCacheError> {
    let entry: CacheEntry = serde_json::from_str(payload)
        .map_err(|err| RosterCacheError::serialization(err.to_string()))?;
    if &entry.key != key {
        return Err(RosterCacheError::serialization(format!(
            "entry stored for {} found under {key}",
            entry.key
        )));
    }
    Ok(entry.into_live_roster(now))
}

fn backend_error(err: impl std::fmt::Display) -> RosterCacheError {
    RosterCacheError::backend(err.to_string())
}

/// [`RosterCache`] backed by Redis.
#[derive(Clone)]
pub struct RedisRosterCache {
    pool: Pool<RedisConnectionManager>,
    clock: Arc<dyn Clock>,
}

impl RedisRosterCache {
    /// Build the connection pool.
    ///
    /// Connections are established lazily, so an unreachable server does not
    /// fail start-up; the facade then degrades to the source.
    ///
    /// # Errors
    ///
    /// Returns `RosterCacheError::Backend` when the URL cannot be parsed.
    pub async fn connect(
        config: RedisCacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RosterCacheError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str()).map_err(backend_error)?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build_unchecked(manager);
        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl RosterCache for RedisRosterCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<OnCallRoster>, RosterCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let payload: Option<String> = conn
            .get(namespaced_key(key))
            .await
            .map_err(backend_error)?;
        match payload {
            Some(payload) => decode_entry(key, &payload, self.clock.utc()),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        roster: &OnCallRoster,
        ttl: Duration,
    ) -> Result<(), RosterCacheError> {
        let ttl = jittered_ttl(ttl, &mut rand::thread_rng());
        let entry = CacheEntry::new(key.clone(), roster.clone(), self.clock.utc(), ttl);
        let payload = encode_entry(&entry)?;
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        redis::cmd("SET")
            .arg(namespaced_key(key))
            .arg(payload)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(backend_error)?;
        debug!(%key, ttl_secs = expiry_seconds(ttl), "stored roster in redis");
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<(), RosterCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        conn.del::<_, ()>(namespaced_key(key))
            .await
            .map_err(backend_error)
    }
}
