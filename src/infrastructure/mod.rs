//! Infrastructure layer - Key store adapters, namespace resolution and logging

pub mod cache;
pub mod logging;

pub use cache::{
    CacheConfig, CacheFactory, GenerationToken, InMemoryKeyStore, InMemoryKeyStoreConfig,
    NamespaceResolver, NamespacedCache, RedisKeyStore, RedisKeyStoreConfig, StoreType,
    TokenGenerator,
};
