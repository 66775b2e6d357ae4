//! Key-value store boundary

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Result;

#[cfg(test)]
use mockall::automock;

/// Networked key-value store the cache rides on
///
/// A TTL of [`Duration::ZERO`] means the entry never expires.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyStore: Send + Sync + Debug {
    /// Reads the bytes stored under `key`, `None` on a miss
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditionally writes `value` under `key`
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Atomically writes `value` only if `key` is absent
    ///
    /// Returns `false` when the key already exists.
    async fn add(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool>;

    /// Removes `key`, returning `false` if there was nothing to remove
    async fn delete(&self, key: &str) -> Result<bool>;
}
