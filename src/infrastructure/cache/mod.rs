//! Cache infrastructure - store adapters, namespace resolution and the cache facade

mod factory;
mod in_memory;
mod namespaced;
mod redis;
mod resolver;
mod token;

pub use factory::{CacheConfig, CacheFactory, StoreType};
pub use in_memory::{InMemoryKeyStore, InMemoryKeyStoreConfig};
pub use namespaced::NamespacedCache;
pub use redis::{RedisKeyStore, RedisKeyStoreConfig};
pub use resolver::NamespaceResolver;
pub use token::{GenerationToken, TokenGenerator, MIN_RANDOM_BYTES};
