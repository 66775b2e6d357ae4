//! nscache
//!
//! Typed cache access over a networked key-value store with:
//! - Flat keys and namespaced keys
//! - O(1) namespace invalidation through generation tokens
//! - Redis and in-memory (moka) stores
//!
//! ```ignore
//! use std::time::Duration;
//! use nscache::{CacheConfig, CacheFactory};
//!
//! let cache = CacheFactory::new().create_cache(&CacheConfig::redis("redis://127.0.0.1")).await?;
//! cache.set(&42, Duration::ZERO, ("users", "alice")).await?;
//! let age: u32 = cache.get(("users", "alice")).await?;
//! cache.delete_namespace("users").await?;
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{CacheAddress, CacheError, JsonCodec, KeyStore, Result, ValueCodec};
pub use infrastructure::{
    CacheConfig, CacheFactory, GenerationToken, InMemoryKeyStore, NamespaceResolver,
    NamespacedCache, RedisKeyStore, StoreType, TokenGenerator,
};
