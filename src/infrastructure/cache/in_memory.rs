//! In-memory key store using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::{KeyStore, Result};

/// Configuration for in-memory key store
#[derive(Debug, Clone)]
pub struct InMemoryKeyStoreConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Time to idle - entries not accessed for this duration are evicted
    pub time_to_idle: Option<Duration>,
}

impl Default for InMemoryKeyStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_idle: None,
        }
    }
}

impl InMemoryKeyStoreConfig {
    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the time-to-idle duration
    pub fn with_time_to_idle(mut self, tti: Duration) -> Self {
        self.time_to_idle = Some(tti);
        self
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    data: Vec<u8>,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn new(data: &[u8], ttl: Duration) -> Self {
        let ttl = (!ttl.is_zero()).then_some(ttl);

        Self {
            data: data.to_vec(),
            ttl,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Expired entries may linger in moka until its maintenance runs
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// Per-entry expiry; entries stored with a zero TTL never expire
struct EntryExpiry;

impl Expiry<String, StoredEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Process-local key store
///
/// Useful for single-process deployments and tests. Capacity-based eviction
/// keeps orphaned namespace entries bounded.
#[derive(Debug, Clone)]
pub struct InMemoryKeyStore {
    cache: MokaCache<String, StoredEntry>,
    config: InMemoryKeyStoreConfig,
}

impl InMemoryKeyStore {
    /// Creates a new in-memory store with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryKeyStoreConfig::default())
    }

    /// Creates a new in-memory store with the given configuration
    pub fn with_config(config: InMemoryKeyStoreConfig) -> Self {
        let mut builder = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry);

        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        Self {
            cache: builder.build(),
            config,
        }
    }

    pub fn config(&self) -> &InMemoryKeyStoreConfig {
        &self.config
    }

    /// Approximate number of live entries
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entry = self.cache.get(key).await;
        Ok(entry.filter(|e| !e.is_expired()).map(|e| e.data))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.cache
            .insert(key.to_string(), StoredEntry::new(value, ttl))
            .await;
        Ok(())
    }

    async fn add(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool> {
        let entry = self
            .cache
            .entry_by_ref(key)
            .or_insert_with(async { StoredEntry::new(value, ttl) })
            .await;

        Ok(entry.is_fresh())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.cache.remove(key).await;
        Ok(removed.is_some_and(|entry| !entry.is_expired()))
    }
}
