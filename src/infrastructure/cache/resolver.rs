//! Namespace resolution
//!
//! A namespace's current generation token is stored in the key store under the
//! namespace name. Resolving reads it, creating it with an atomic add on a miss.
//! Replacing it orphans every key built from the previous token.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{CacheError, KeyStore, Result};

use super::token::{GenerationToken, TokenGenerator};

/// Maps namespace names to their current generation token
///
/// One resolver, and one resolution lock, exists per key store client.
#[derive(Debug)]
pub struct NamespaceResolver {
    store: Arc<dyn KeyStore>,
    generator: TokenGenerator,
    namespace_ttl: Duration,
    resolve_lock: Mutex<()>,
}

impl NamespaceResolver {
    /// Creates a resolver whose token entries never expire
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self::with_generator(store, TokenGenerator::new())
    }

    /// Creates a resolver using a custom token generator
    pub fn with_generator(store: Arc<dyn KeyStore>, generator: TokenGenerator) -> Self {
        Self {
            store,
            generator,
            namespace_ttl: Duration::ZERO,
            resolve_lock: Mutex::new(()),
        }
    }

    /// Sets the TTL applied to namespace token entries (zero = never expire)
    pub fn with_namespace_ttl(mut self, ttl: Duration) -> Self {
        self.namespace_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    /// Returns the current token for `namespace`, creating one if absent
    ///
    /// Resolutions are serialized per resolver. Races with other processes are
    /// settled by the store's atomic add: the loser re-reads the winner's token.
    pub async fn current_token(&self, namespace: &str) -> Result<GenerationToken> {
        let _guard = self.resolve_lock.lock().await;

        if let Some(bytes) = self.read(namespace).await? {
            let token = GenerationToken::from_stored(namespace, bytes)?;
            debug!(namespace, token = %token, "Resolved namespace token");
            return Ok(token);
        }

        let token = self.generator.generate();
        let created = self
            .store
            .add(namespace, token.as_bytes(), self.namespace_ttl)
            .await
            .inspect_err(|e| warn!(namespace, error = %e, "Failed to create namespace token"))?;

        if created {
            debug!(namespace, token = %token, "Created namespace token");
            return Ok(token);
        }

        debug!(namespace, "Lost namespace creation race, re-reading token");

        match self.read(namespace).await? {
            Some(bytes) => GenerationToken::from_stored(namespace, bytes),
            None => Err(CacheError::not_found(namespace)),
        }
    }

    /// Replaces the token for `namespace` with a fresh one
    ///
    /// Succeeds whether or not the namespace existed before.
    pub async fn invalidate(&self, namespace: &str) -> Result<GenerationToken> {
        let token = self.generator.generate();

        self.store
            .set(namespace, token.as_bytes(), self.namespace_ttl)
            .await
            .inspect_err(|e| warn!(namespace, error = %e, "Failed to replace namespace token"))?;

        debug!(namespace, token = %token, "Invalidated namespace");
        Ok(token)
    }

    async fn read(&self, namespace: &str) -> Result<Option<Vec<u8>>> {
        self.store
            .get(namespace)
            .await
            .inspect_err(|e| warn!(namespace, error = %e, "Failed to read namespace token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockKeyStore;
    use crate::infrastructure::cache::InMemoryKeyStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn in_memory_resolver() -> NamespaceResolver {
        NamespaceResolver::new(Arc::new(InMemoryKeyStore::new()))
    }

    #[tokio::test]
    async fn test_first_resolution_creates_token() {
        let store = Arc::new(InMemoryKeyStore::new());
        let resolver = NamespaceResolver::new(store.clone());

        let token = resolver.current_token("ns1").await.unwrap();

        let stored = store.get("ns1").await.unwrap();
        assert_eq!(stored, Some(token.as_bytes().to_vec()));
    }

    #[tokio::test]
    async fn test_resolution_is_stable() {
        let resolver = in_memory_resolver();

        let first = resolver.current_token("ns1").await.unwrap();
        let second = resolver.current_token("ns1").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_namespaces_get_distinct_tokens() {
        let resolver = in_memory_resolver();

        let ns1 = resolver.current_token("ns1").await.unwrap();
        let ns2 = resolver.current_token("ns2").await.unwrap();

        assert_ne!(ns1, ns2);
    }

    #[tokio::test]
    async fn test_invalidate_replaces_token() {
        let resolver = in_memory_resolver();

        let before = resolver.current_token("ns1").await.unwrap();
        let replaced = resolver.invalidate("ns1").await.unwrap();
        let after = resolver.current_token("ns1").await.unwrap();

        assert_ne!(before, after);
        assert_eq!(replaced, after);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_namespace() {
        let resolver = in_memory_resolver();

        let created = resolver.invalidate("never-seen").await.unwrap();
        let resolved = resolver.current_token("never-seen").await.unwrap();

        assert_eq!(created, resolved);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_resolution_converges() {
        let resolver = Arc::new(in_memory_resolver());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.current_token("cold").await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let tokens: HashSet<GenerationToken> = results
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(tokens.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_independent_resolvers_converge_on_shared_store() {
        for round in 0..20 {
            let store: Arc<dyn KeyStore> = Arc::new(InMemoryKeyStore::new());
            let namespace = format!("cold-{}", round);

            // One resolver per task, each with its own lock, like separate processes
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let resolver = NamespaceResolver::new(store.clone());
                    let namespace = namespace.clone();
                    tokio::spawn(async move { resolver.current_token(&namespace).await })
                })
                .collect();

            let results = futures::future::join_all(handles).await;
            let tokens: HashSet<GenerationToken> = results
                .into_iter()
                .map(|joined| joined.unwrap().unwrap())
                .collect();

            assert_eq!(tokens.len(), 1);

            let stored = store.get(&namespace).await.unwrap().unwrap();
            assert!(tokens.contains(&GenerationToken::from_stored(&namespace, stored).unwrap()));
        }
    }

    /// Store where another process creates the namespace between our miss and our add
    #[derive(Debug)]
    struct RacingStore {
        inner: InMemoryKeyStore,
        winner: &'static str,
        adds: AtomicUsize,
    }

    #[async_trait]
    impl KeyStore for RacingStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
            self.inner.set(key, value, ttl).await
        }

        async fn add(&self, key: &str, value: &[u8], ttl: Duration) -> Result<bool> {
            if self.adds.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.set(key, self.winner.as_bytes(), ttl).await?;
            }
            self.inner.add(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> Result<bool> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_returns_winner_token() {
        let store = Arc::new(RacingStore {
            inner: InMemoryKeyStore::new(),
            winner: "winner-token",
            adds: AtomicUsize::new(0),
        });
        let resolver = NamespaceResolver::new(store);

        let token = resolver.current_token("ns1").await.unwrap();
        assert_eq!(token.as_str(), "winner-token");
    }

    #[tokio::test]
    async fn test_initial_read_error_propagates() {
        let mut store = MockKeyStore::new();
        store
            .expect_get()
            .returning(|_| Err(CacheError::store("connection reset")));
        store.expect_add().never();

        let resolver = NamespaceResolver::new(Arc::new(store));

        let result = resolver.current_token("ns1").await;
        assert!(matches!(result, Err(CacheError::Store { .. })));
    }

    #[tokio::test]
    async fn test_add_error_propagates() {
        let mut store = MockKeyStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));
        store
            .expect_add()
            .times(1)
            .returning(|_, _, _| Err(CacheError::store("server out of memory")));

        let resolver = NamespaceResolver::new(Arc::new(store));

        let result = resolver.current_token("ns1").await;
        assert!(matches!(result, Err(CacheError::Store { .. })));
    }

    #[tokio::test]
    async fn test_fallback_read_error_propagates() {
        let mut store = MockKeyStore::new();
        let mut reads = 0;
        store.expect_get().times(2).returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(None)
            } else {
                Err(CacheError::store("timeout"))
            }
        });
        store.expect_add().times(1).returning(|_, _, _| Ok(false));

        let resolver = NamespaceResolver::new(Arc::new(store));

        let result = resolver.current_token("ns1").await;
        assert!(matches!(result, Err(CacheError::Store { .. })));
    }

    #[tokio::test]
    async fn test_fallback_read_miss_reports_not_found() {
        let mut store = MockKeyStore::new();
        store.expect_get().times(2).returning(|_| Ok(None));
        store.expect_add().times(1).returning(|_, _, _| Ok(false));

        let resolver = NamespaceResolver::new(Arc::new(store));

        let err = resolver.current_token("ns1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_namespace_ttl_passed_to_store() {
        let mut store = MockKeyStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_add()
            .withf(|key, _, ttl| key == "ns1" && *ttl == Duration::from_secs(300))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let resolver =
            NamespaceResolver::new(Arc::new(store)).with_namespace_ttl(Duration::from_secs(300));

        resolver.current_token("ns1").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_uses_plain_set() {
        let mut store = MockKeyStore::new();
        store.expect_get().never();
        store.expect_add().never();
        store
            .expect_set()
            .withf(|key, _, ttl| key == "ns1" && ttl.is_zero())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let resolver = NamespaceResolver::new(Arc::new(store));

        resolver.invalidate("ns1").await.unwrap();
    }
}
