//! Process-lifetime memoization of upstream responses. Entries are never
//! invalidated; capacity only guards against unbounded growth.

use crate::errors::{CatalogError, Result};
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS};
use moka::future::Cache;
use shared::counter;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

pub struct ResponseCache<K, V> {
    name: &'static str,
    cache: Cache<K, V>,
}

impl<K, V> ResponseCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        ResponseCache { name, cache }
    }

    /// Returns the cached value for `key`, or runs `fetcher` and stores its
    /// result. A failed fetch is not stored, so the next call retries.
    ///
    /// Concurrent calls for the same key wait on a single fetch. Distinct keys
    /// never block each other.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.cache.get(&key).await {
            counter!(CACHE_HIT, "cache" => self.name).increment(1);
            return Ok(value);
        }

        counter!(CACHE_MISS, "cache" => self.name).increment(1);
        self.cache
            .try_get_with(key, fetcher())
            .await
            .map_err(|err: Arc<CatalogError>| (*err).clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains_key(key)
    }
}
