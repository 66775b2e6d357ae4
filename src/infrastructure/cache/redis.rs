//! Redis key store implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::{CacheError, KeyStore, Result};

/// Configuration for Redis key store
#[derive(Debug, Clone)]
pub struct RedisKeyStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for sharing a database between applications
    pub key_prefix: Option<String>,
}

impl Default for RedisKeyStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisKeyStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

/// Redis key store
///
/// - `add` maps to `SET NX`, atomic on the server
/// - zero TTL writes keys without expiry
/// - connection pooling via ConnectionManager
#[derive(Clone)]
pub struct RedisKeyStore {
    connection: ConnectionManager,
    config: RedisKeyStoreConfig,
}

impl fmt::Debug for RedisKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisKeyStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisKeyStore {
    /// Creates a new Redis connection
    pub async fn new(config: RedisKeyStoreConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::store(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::store(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    /// Creates a Redis key store with default configuration
    pub async fn with_url(url: impl Into<String>) -> Result<Self> {
        Self::new(RedisKeyStoreConfig::new(url)).await
    }

    /// Whole seconds for `EX`; sub-second TTLs round up to one second
    fn ttl_secs(ttl: Duration) -> Option<u64> {
        if ttl.is_zero() {
            None
        } else {
            Some(ttl.as_secs().max(1))
        }
    }
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let prefixed_key = self.config.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Option<Vec<u8>> = conn
            .get(&prefixed_key)
            .await
            .map_err(|e| CacheError::store(format!("Failed to get key '{}': {}", key, e)))?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let prefixed_key = self.config.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: redis::RedisResult<()> = match Self::ttl_secs(ttl) {
            Some(secs) => conn.set_ex(&prefixed_key, value, secs).await,
            None => conn.set(&prefixed_key, value).await,
        };

        result.map_err(|e| CacheError::store(format!("Failed to set key '{}': {}", key, e)))
    }

    async fn add(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool> {
        let prefixed_key = self.config.prefix_key(key);
        let mut conn = self.connection.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&prefixed_key).arg(value).arg("NX");

        if let Some(secs) = Self::ttl_secs(ttl) {
            cmd.arg("EX").arg(secs);
        }

        // Redis returns "OK" if set, nil if the key existed
        let result: Option<String> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::store(format!("Failed to add key '{}': {}", key, e)))?;

        Ok(result.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let prefixed_key = self.config.prefix_key(key);
        let mut conn = self.connection.clone();

        let deleted: i64 = conn
            .del(&prefixed_key)
            .await
            .map_err(|e| CacheError::store(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests require a running Redis instance
    // Run with: cargo test -- --ignored

    fn get_test_config() -> RedisKeyStoreConfig {
        RedisKeyStoreConfig::new("redis://127.0.0.1:6379").with_key_prefix("nscache-test")
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_and_get() {
        let store = RedisKeyStore::new(get_test_config()).await.unwrap();

        store
            .set("key1", b"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result = store.get("key1").await.unwrap();
        assert_eq!(result, Some(b"value1".to_vec()));

        // Cleanup
        store.delete("key1").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_delete() {
        let store = RedisKeyStore::new(get_test_config()).await.unwrap();

        store.set("key2", b"value", Duration::ZERO).await.unwrap();

        assert!(store.delete("key2").await.unwrap());
        assert!(!store.delete("key2").await.unwrap());
        assert!(store.get("key2").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_add() {
        let store = RedisKeyStore::new(get_test_config()).await.unwrap();
        store.delete("nx_key").await.unwrap();

        // First add should succeed
        assert!(store.add("nx_key", b"value1", Duration::ZERO).await.unwrap());

        // Second add should fail
        assert!(!store.add("nx_key", b"value2", Duration::ZERO).await.unwrap());
        assert_eq!(store.get("nx_key").await.unwrap(), Some(b"value1".to_vec()));

        // Cleanup
        store.delete("nx_key").await.unwrap();
    }

    #[test]
    fn test_key_prefix() {
        let config = RedisKeyStoreConfig::new("redis://localhost").with_key_prefix("myapp");
        assert_eq!(config.prefix_key("ns1"), "myapp:ns1");

        let config = RedisKeyStoreConfig::new("redis://localhost");
        assert_eq!(config.prefix_key("ns1"), "ns1");
    }

    #[test]
    fn test_ttl_secs() {
        assert_eq!(RedisKeyStore::ttl_secs(Duration::ZERO), None);
        assert_eq!(RedisKeyStore::ttl_secs(Duration::from_millis(200)), Some(1));
        assert_eq!(RedisKeyStore::ttl_secs(Duration::from_secs(90)), Some(90));
    }
}
