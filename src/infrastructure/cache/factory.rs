//! Cache factory for runtime store selection

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{CacheError, KeyStore, Result};

use super::in_memory::{InMemoryKeyStore, InMemoryKeyStoreConfig};
use super::namespaced::NamespacedCache;
use super::redis::{RedisKeyStore, RedisKeyStoreConfig};
use super::resolver::NamespaceResolver;
use super::token::{TokenGenerator, MIN_RANDOM_BYTES};

/// Supported key store types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StoreType {
    /// Process-local store using moka
    #[default]
    InMemory,
    /// Redis server
    Redis,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::InMemory => write!(f, "in_memory"),
            StoreType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreType {
    type Err = CacheError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreType::InMemory),
            "redis" => Ok(StoreType::Redis),
            _ => Err(CacheError::configuration(format!(
                "Unknown store type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Type of key store to create
    pub store_type: StoreType,
    /// Redis URL (required for Redis type)
    pub redis_url: Option<String>,
    /// Key prefix (Redis only)
    pub key_prefix: Option<String>,
    /// Maximum capacity (in-memory only)
    pub max_capacity: Option<u64>,
    /// Time to idle (in-memory only)
    pub time_to_idle: Option<Duration>,
    /// TTL of namespace token entries, zero for none
    pub namespace_ttl: Duration,
    /// Random bytes per generation token
    pub token_random_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::InMemory,
            redis_url: None,
            key_prefix: None,
            max_capacity: Some(10_000),
            time_to_idle: None,
            namespace_ttl: Duration::ZERO,
            token_random_bytes: MIN_RANDOM_BYTES,
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration for in-memory store
    pub fn in_memory() -> Self {
        Self {
            store_type: StoreType::InMemory,
            ..Default::default()
        }
    }

    /// Creates a new configuration for Redis store
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            store_type: StoreType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the maximum capacity (in-memory only)
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the time-to-idle (in-memory only)
    pub fn with_time_to_idle(mut self, tti: Duration) -> Self {
        self.time_to_idle = Some(tti);
        self
    }

    /// Sets the TTL of namespace token entries
    pub fn with_namespace_ttl(mut self, ttl: Duration) -> Self {
        self.namespace_ttl = ttl;
        self
    }

    /// Sets the random bytes per generation token
    pub fn with_token_random_bytes(mut self, bytes: usize) -> Self {
        self.token_random_bytes = bytes;
        self
    }

    /// Creates config from environment variables
    ///
    /// Set but unparseable variables are configuration errors, never defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_type: StoreType = lookup("CACHE_TYPE")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();

        let redis_url = lookup("REDIS_URL");
        if store_type == StoreType::Redis && redis_url.is_none() {
            return Err(CacheError::configuration(
                "REDIS_URL is required when CACHE_TYPE is redis",
            ));
        }

        let max_capacity = parse_var(&lookup, "CACHE_MAX_CAPACITY")?.or(Some(10_000));
        let time_to_idle =
            parse_var(&lookup, "CACHE_TIME_TO_IDLE_SECS")?.map(Duration::from_secs);
        let namespace_ttl = parse_var(&lookup, "CACHE_NAMESPACE_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);

        let token_random_bytes =
            parse_var(&lookup, "CACHE_TOKEN_RANDOM_BYTES")?.unwrap_or(MIN_RANDOM_BYTES);
        if token_random_bytes < MIN_RANDOM_BYTES {
            return Err(CacheError::configuration(format!(
                "CACHE_TOKEN_RANDOM_BYTES must be at least {}, got {}",
                MIN_RANDOM_BYTES, token_random_bytes
            )));
        }

        Ok(Self {
            store_type,
            redis_url,
            key_prefix: lookup("CACHE_KEY_PREFIX"),
            max_capacity,
            time_to_idle,
            namespace_ttl,
            token_random_bytes,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e| {
                CacheError::configuration(format!("Invalid value '{}' for {}: {}", raw, name, e))
            })
        })
        .transpose()
}

/// Factory for creating key stores and caches
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates a key store based on configuration
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn KeyStore>> {
        match config.store_type {
            StoreType::InMemory => {
                let mut in_memory_config = InMemoryKeyStoreConfig::default();

                if let Some(capacity) = config.max_capacity {
                    in_memory_config = in_memory_config.with_max_capacity(capacity);
                }

                if let Some(tti) = config.time_to_idle {
                    in_memory_config = in_memory_config.with_time_to_idle(tti);
                }

                Ok(Arc::new(InMemoryKeyStore::with_config(in_memory_config)))
            }
            StoreType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    CacheError::configuration("Redis URL is required for Redis store type")
                })?;

                let mut redis_config = RedisKeyStoreConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let store = RedisKeyStore::new(redis_config).await?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Creates a JSON-encoding namespaced cache based on configuration
    pub async fn create_cache(&self, config: &CacheConfig) -> Result<NamespacedCache> {
        let generator = TokenGenerator::with_random_bytes(config.token_random_bytes)?;
        let store = self.create(config).await?;

        tracing::info!(
            store_type = %config.store_type,
            namespace_ttl_secs = config.namespace_ttl.as_secs(),
            "Cache store created"
        );

        let resolver = NamespaceResolver::with_generator(store, generator)
            .with_namespace_ttl(config.namespace_ttl);

        Ok(NamespacedCache::from_parts(resolver, Default::default()))
    }

    /// Creates an in-memory store with default settings
    pub fn create_in_memory(&self) -> Arc<dyn KeyStore> {
        Arc::new(InMemoryKeyStore::new())
    }

    /// Creates a Redis store
    pub async fn create_redis(&self, url: impl Into<String>) -> Result<Arc<dyn KeyStore>> {
        let store = RedisKeyStore::with_url(url).await?;
        Ok(Arc::new(store))
    }
}
