//! In-memory cache storage.
//!
//! A `HashMap` behind a tokio mutex. The default for tests and a valid
//! zero-setup production mode when durability is not needed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;

use super::store::{CacheEntry, CacheStorage};

/// Non-durable storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStore {
    async fn fetch(&self, key: &str, now: i64) -> Result<Option<CacheEntry>> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            // Expired entries stay in place until a sweep so stats can
            // report them; reads just don't see them.
            Some(entry) if !entry.is_expired(now) => {
                entry.hit_count = entry.hit_count.saturating_add(1);
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        self.entries.lock().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn sweep(&self, now: i64) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        let count = entries.len() as u64;
        entries.clear();
        Ok(count)
    }

    async fn snapshot(&self) -> Result<Vec<CacheEntry>> {
        Ok(self.entries.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::RequestKind;
    use serde_json::json;

    fn entry(key: &str, expires_at: i64) -> CacheEntry {
        CacheEntry {
            key: key.into(),
            kind: RequestKind::Ask,
            query: format!("query for {key}"),
            payload: json!({"response": "crusty"}),
            variant: None,
            hit_count: 0,
            created_at: 0,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_fetch_increments_hit_count() {
        let store = MemoryStore::new();
        store.upsert(entry("k1", 100)).await.unwrap();
        let first = store.fetch("k1", 10).await.unwrap().unwrap();
        assert_eq!(first.hit_count, 1);
        let second = store.fetch("k1", 10).await.unwrap().unwrap();
        assert_eq!(second.hit_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.fetch("nope", 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_invisible_but_counted() {
        let store = MemoryStore::new();
        store.upsert(entry("k1", 50)).await.unwrap();
        assert!(store.fetch("k1", 50).await.unwrap().is_none());
        // Still present for stats until swept.
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_resets() {
        let store = MemoryStore::new();
        store.upsert(entry("k1", 100)).await.unwrap();
        store.fetch("k1", 10).await.unwrap();
        // Replacement carries a fresh hit_count of 0.
        store.upsert(entry("k1", 200)).await.unwrap();
        let fetched = store.fetch("k1", 10).await.unwrap().unwrap();
        assert_eq!(fetched.hit_count, 1);
        assert_eq!(fetched.expires_at, 200);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemoryStore::new();
        store.upsert(entry("dead", 10)).await.unwrap();
        store.upsert(entry("live", 100)).await.unwrap();
        assert_eq!(store.sweep(50).await.unwrap(), 1);
        assert_eq!(store.sweep(50).await.unwrap(), 0);
        assert!(store.fetch("live", 50).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_counts_everything() {
        let store = MemoryStore::new();
        store.upsert(entry("a", 100)).await.unwrap();
        store.upsert(entry("b", 100)).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
