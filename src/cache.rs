// ABOUTME: In-memory cache with LRU eviction, TTL support and pattern invalidation
// ABOUTME: Serves catalog reads; writes invalidate by glob key patterns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! In-process TTL cache for catalog reads (exercises, foods, brand).
//!
//! Values are stored JSON-serialized so heterogeneous types share one map.
//! Keys follow a `resource:qualifier` convention (`exercises:list:all`,
//! `brand:settings`) so a write can invalidate a whole resource with a
//! glob pattern like `exercises:*`.

use crate::errors::{AppError, AppResult};
use lru::LruCache;
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory cache with LRU eviction and TTL expiry
#[derive(Clone)]
pub struct Cache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    default_ttl: Duration,
}

impl Cache {
    /// Fallback capacity when zero is requested
    const DEFAULT_CAPACITY: usize = 1000;

    /// Create a cache bounded to `max_entries` with the given default TTL
    #[must_use]
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries)
            .or_else(|| NonZeroUsize::new(Self::DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            default_ttl,
        }
    }

    /// Store a value under `key` with the default TTL
    ///
    /// # Errors
    ///
    /// Returns an error if the value fails to serialize.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Store a value under `key` with an explicit TTL
    ///
    /// # Errors
    ///
    /// Returns an error if the value fails to serialize.
    pub async fn set_with_ttl<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        let entry = CacheEntry::new(serialized, ttl);
        self.store.write().await.push(key.to_owned(), entry);
        Ok(())
    }

    /// Fetch a value, removing it when expired
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value fails to deserialize into `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order)
        if let Some(entry) = store.get(key) {
            if entry.is_expired() {
                store.pop(key);
                return Ok(None);
            }
            let value: T = serde_json::from_slice(&entry.data)?;
            return Ok(Some(value));
        }

        Ok(None)
    }

    /// Remove a single key
    pub async fn invalidate(&self, key: &str) {
        self.store.write().await.pop(key);
    }

    /// Remove every key matching a glob pattern, returning the count
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid glob pattern.
    pub async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| AppError::internal(format!("Invalid glob pattern '{pattern}': {e}")))?;

        let mut store = self.store.write().await;

        // Collect first (can't modify while iterating)
        let keys_to_remove: Vec<String> = store
            .iter()
            .filter(|(k, _)| glob_pattern.matches(k))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &keys_to_remove {
            store.pop(key);
        }

        let removed = keys_to_remove.len() as u64;
        drop(store);
        if removed > 0 {
            tracing::debug!("Invalidated {removed} cache entries matching {pattern}");
        }
        Ok(removed)
    }

    /// Remove expired entries; called periodically from a background task
    pub async fn cleanup_expired(&self) {
        let mut store = self.store.write().await;

        let expired_keys: Vec<String> = store
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired_keys {
            store.pop(key);
        }

        let removed = expired_keys.len();
        drop(store);
        if removed > 0 {
            tracing::debug!("Cleaned up {removed} expired cache entries");
        }
    }

    /// Spawn the periodic cleanup task for this cache
    pub fn spawn_cleanup_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                cache.cleanup_expired().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache.set("exercises:list:all", &vec![1, 2, 3]).await.unwrap();

        let value: Option<Vec<i32>> = cache.get("exercises:list:all").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = cache.get("exercises:list:other").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache
            .set_with_ttl("brand:settings", &"forma", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let value: Option<String> = cache.get("brand:settings").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_pattern_invalidation() {
        let cache = Cache::new(10, Duration::from_secs(60));
        cache.set("exercises:list:all", &1).await.unwrap();
        cache.set("exercises:item:abc", &2).await.unwrap();
        cache.set("foods:list:all", &3).await.unwrap();

        let removed = cache.invalidate_pattern("exercises:*").await.unwrap();
        assert_eq!(removed, 2);

        let gone: Option<i32> = cache.get("exercises:list:all").await.unwrap();
        assert!(gone.is_none());
        let kept: Option<i32> = cache.get("foods:list:all").await.unwrap();
        assert_eq!(kept, Some(3));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = Cache::new(2, Duration::from_secs(60));
        cache.set("a", &1).await.unwrap();
        cache.set("b", &2).await.unwrap();
        cache.set("c", &3).await.unwrap();

        let evicted: Option<i32> = cache.get("a").await.unwrap();
        assert!(evicted.is_none());
        let kept: Option<i32> = cache.get("c").await.unwrap();
        assert_eq!(kept, Some(3));
    }
}
