//! Cache facade with flat and namespaced addressing

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::domain::{
    effective_key, CacheAddress, CacheError, JsonCodec, KeyStore, Result, ValueCodec,
};

use super::resolver::NamespaceResolver;
use super::token::TokenGenerator;

/// Typed cache over a [`KeyStore`]
///
/// Namespaced entries live under `<token>:<key>`, where `<token>` is the
/// namespace's current generation. [`delete_namespace`](Self::delete_namespace)
/// swaps the token, so every entry written under the old one becomes
/// unreachable in a single store write. Orphaned entries are left to the
/// store's own TTL and eviction.
#[derive(Debug)]
pub struct NamespacedCache<C: ValueCodec = JsonCodec> {
    store: Arc<dyn KeyStore>,
    resolver: NamespaceResolver,
    codec: C,
}

impl NamespacedCache<JsonCodec> {
    /// Creates a JSON-encoding cache over `store`
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<C: ValueCodec> NamespacedCache<C> {
    /// Creates a cache with a custom value codec
    pub fn with_codec(store: Arc<dyn KeyStore>, codec: C) -> Self {
        let resolver = NamespaceResolver::new(store.clone());
        Self::from_parts(resolver, codec)
    }

    /// Creates a cache around an existing resolver
    pub fn from_parts(resolver: NamespaceResolver, codec: C) -> Self {
        Self {
            store: resolver.store().clone(),
            resolver,
            codec,
        }
    }

    /// Creates a cache using a custom token generator
    pub fn with_generator(store: Arc<dyn KeyStore>, generator: TokenGenerator, codec: C) -> Self {
        Self::from_parts(NamespaceResolver::with_generator(store, generator), codec)
    }

    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Gets the value stored at `address`
    ///
    /// Returns [`CacheError::NotFound`] when nothing is stored there and
    /// [`CacheError::Decode`] when the stored bytes are not a `V`.
    pub async fn get<V>(&self, address: impl Into<CacheAddress>) -> Result<V>
    where
        V: DeserializeOwned,
    {
        let key = self.resolve(&address.into()).await?;

        match self.store.get(&key).await? {
            Some(bytes) => self.codec.decode(&bytes),
            None => Err(CacheError::not_found(key)),
        }
    }

    /// Stores `value` at `address`; a zero `ttl` never expires
    pub async fn set<V>(
        &self,
        value: &V,
        ttl: Duration,
        address: impl Into<CacheAddress>,
    ) -> Result<()>
    where
        V: Serialize + ?Sized,
    {
        let bytes = self.codec.encode(value)?;
        let key = self.resolve(&address.into()).await?;

        self.store.set(&key, &bytes, ttl).await
    }

    /// Deletes the entry at `address`
    ///
    /// Returns [`CacheError::NotFound`] when there was nothing to delete.
    pub async fn delete(&self, address: impl Into<CacheAddress>) -> Result<()> {
        let key = self.resolve(&address.into()).await?;

        if self.store.delete(&key).await? {
            Ok(())
        } else {
            Err(CacheError::not_found(key))
        }
    }

    /// Invalidates every entry under `namespace`
    ///
    /// Never fails because the namespace did not exist yet.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.resolver.invalidate(namespace).await.map(|_| ())
    }

    async fn resolve(&self, address: &CacheAddress) -> Result<String> {
        let key = match address.namespace() {
            None => address.key().to_string(),
            Some(namespace) => {
                let token = self.resolver.current_token(namespace).await?;
                effective_key(token.as_str(), address.key())
            }
        };

        debug!(address = %address, effective_key = %key, "Resolved cache address");
        Ok(key)
    }
}
