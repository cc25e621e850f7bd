// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Cache, CacheResult};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process implementation of `Cache`, backed by a `HashMap` under a
/// read-write lock. Append-mostly and best-effort: reads of an expired
/// entry are treated as a miss and the entry is lazily reclaimed.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, including ones that have expired but not
    /// yet been reclaimed by a `get`.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_round_trip() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_miss_on_absent_key() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), 0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_del_is_idempotent() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), 60).await.unwrap();
        cache.del("k").await.unwrap();
        cache.del("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v1".to_vec(), 60).await.unwrap();
        cache.set("k", b"v2".to_vec(), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v2".to_vec()));
    }
}
