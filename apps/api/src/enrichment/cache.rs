//! Expiring cache: keyed storage with time-based expiry, used to bound calls
//! to external lookup services.
//!
//! Slots are whole-entry replacements, so concurrent writers resolve as
//! last-writer-wins. Expired entries are evicted lazily on read. Caching is
//! best-effort: store failures are logged and reported as misses, never as errors.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Cache store poisoned")]
    Poisoned,
}

/// Source of "now". Production uses the system clock; tests move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Raw slot storage. One serialized payload per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrites the slot. `ttl` lets stores with native expiry reclaim the slot themselves.
    async fn write(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError>;

    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Debug)]
struct MemorySlot {
    payload: String,
    deadline: Option<Instant>,
}

/// In-process store. Used when no Redis URL is configured, and in tests.
/// Every write sweeps slots past their ttl, so keys that are never read again
/// do not pile up.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    slots: Mutex<HashMap<String, MemorySlot>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let slots = self.slots.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(slots.get(key).map(|slot| slot.payload.clone()))
    }

    async fn write(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let deadline = ttl.to_std().ok().and_then(|ttl| now.checked_add(ttl));

        let mut slots = self.slots.lock().map_err(|_| CacheError::Poisoned)?;
        let before = slots.len();
        slots.retain(|_, slot| slot.deadline.map_or(true, |d| d > now));
        if slots.len() < before {
            debug!("Swept {} expired cache slots", before - slots.len());
        }
        slots.insert(key.to_string(), MemorySlot { payload, deadline });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut slots = self.slots.lock().map_err(|_| CacheError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// Redis-backed store. Slots are plain string keys written with `SET .. EX`.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(payload)
    }

    async fn write(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl.num_seconds().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

/// What actually sits in a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

/// Typed cache over a `CacheStore`, keyed by a hash of the normalized query.
pub struct ExpiringCache<T> {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for ExpiringCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            namespace: self.namespace.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> ExpiringCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, namespace: &str) -> Self {
        Self {
            store,
            clock,
            namespace: namespace.to_string(),
            _value: PhantomData,
        }
    }

    /// Storage key for a query: `<namespace>:<sha256 of the normalized query>`.
    /// "Salt", " salt " and "SALT" share a slot.
    pub fn key_for(&self, query: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_query(query).as_bytes());
        format!("{}:{}", self.namespace, hex::encode(hasher.finalize()))
    }

    /// Returns the cached value if present and not expired. Expired slots are deleted.
    pub async fn get(&self, query: &str) -> Option<T> {
        let key = self.key_for(query);

        let payload = match self.store.read(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read error for {query:?}: {e}");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&payload) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding undecodable cache slot for {query:?}: {e}");
                self.evict(&key).await;
                return None;
            }
        };

        if entry.expires_at <= self.clock.now() {
            debug!("Cache entry for {query:?} expired at {}", entry.expires_at);
            self.evict(&key).await;
            return None;
        }

        debug!("Cache hit for {query:?}");
        Some(entry.value)
    }

    /// Unconditionally overwrites the slot with `value`, expiring `ttl` from now.
    /// A ttl that is not positive, or that overflows the timestamp, skips caching.
    pub async fn set(&self, query: &str, value: T, ttl: Duration) {
        if ttl <= Duration::zero() {
            warn!("Not caching {query:?}: ttl {ttl} is not positive");
            return;
        }
        let Some(expires_at) = self.clock.now().checked_add_signed(ttl) else {
            warn!("Not caching {query:?}: ttl {ttl} overflows the expiry timestamp");
            return;
        };

        let key = self.key_for(query);
        let entry = CacheEntry {
            key: key.clone(),
            value,
            expires_at,
        };

        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Cache encode error for {query:?}: {e}");
                return;
            }
        };

        match self.store.write(&key, payload, ttl).await {
            Ok(()) => debug!("Cached value for {query:?} until {}", entry.expires_at),
            Err(e) => warn!("Cache write error for {query:?}: {e}"),
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!("Cache eviction error for {key}: {e}");
        }
    }
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
