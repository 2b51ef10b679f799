//! Cache facade used by the request handlers.
//!
//! Wraps a [`CacheStorage`] backend with the enabled flag, per-kind TTL
//! policy, fail-open semantics, and stats aggregation. The cache is a pure
//! optimization: a storage fault on `get` degrades to a miss and on `put`
//! is logged and swallowed, so producing a response never depends on it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::Result;

use super::key::derive_key;
use super::store::{CacheEntry, CacheStorage, Clock, RequestKind, SystemClock};

/// Characters of the original query kept in the top-queries report.
const QUERY_PREFIX_LEN: usize = 80;
/// Number of entries in the top-queries report.
const TOP_QUERIES_LIMIT: usize = 10;

/// TTL-expiring response cache over pluggable storage.
pub struct ResponseCache {
    storage: Arc<dyn CacheStorage>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(storage: Arc<dyn CacheStorage>, config: CacheConfig) -> Self {
        Self::with_clock(storage, config, Arc::new(SystemClock))
    }

    /// Construct with an explicit clock so tests can pin time.
    pub fn with_clock(
        storage: Arc<dyn CacheStorage>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            config,
            clock,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Derive the cache key for a request. Pure; see [`derive_key`].
    pub fn key_for(&self, kind: RequestKind, text: &str) -> String {
        derive_key(text, kind)
    }

    /// Configured TTL for a request kind, in seconds.
    pub fn ttl_for(&self, kind: RequestKind) -> i64 {
        self.config.ttl_for(kind)
    }

    /// Look up a live entry, incrementing its hit count.
    ///
    /// Returns `None` on miss, on expiry, when the cache is disabled, and on
    /// storage faults (fail open — a redundant upstream call beats blocking
    /// the user).
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }
        let now = self.clock.now_unix();
        match self.storage.fetch(key, now).await {
            Ok(Some(entry)) => {
                debug!(key, kind = %entry.kind, hits = entry.hit_count, "cache hit");
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key, "cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    /// Upsert an entry with `expires_at = now + ttl_secs`, resetting its hit
    /// count to 0. No-op when disabled. Storage faults are logged and
    /// swallowed — losing a cache write is not user-visible.
    pub async fn put(
        &self,
        key: &str,
        kind: RequestKind,
        query: &str,
        payload: Value,
        variant: Option<&str>,
        ttl_secs: i64,
    ) {
        if !self.config.enabled {
            return;
        }
        let now = self.clock.now_unix();
        let entry = CacheEntry {
            key: key.to_string(),
            kind,
            query: query.to_string(),
            payload,
            variant: variant.map(String::from),
            hit_count: 0,
            created_at: now,
            expires_at: now + ttl_secs.max(0),
        };
        if let Err(e) = self.storage.upsert(entry).await {
            warn!(key, "cache write failed, continuing without it: {e}");
        } else {
            debug!(key, %kind, ttl_secs, "cache write");
        }
    }

    /// Delete all expired entries; returns the number removed. Idempotent.
    pub async fn sweep_expired(&self) -> Result<u64> {
        self.storage.sweep(self.clock.now_unix()).await
    }

    /// Unconditionally delete every entry; returns the number removed.
    /// Destructive admin action.
    pub async fn clear_all(&self) -> Result<u64> {
        self.storage.clear().await
    }

    /// Aggregate statistics over the whole store, expired entries included.
    pub async fn stats(&self) -> Result<CacheStatsReport> {
        let now = self.clock.now_unix();
        let entries = self.storage.snapshot().await?;

        let total = entries.len();
        let expired = entries.iter().filter(|e| e.is_expired(now)).count();
        let total_hits: u64 = entries.iter().map(|e| e.hit_count).sum();

        let mut by_kind: BTreeMap<String, KindStats> = BTreeMap::new();
        for entry in &entries {
            let stats = by_kind.entry(entry.kind.to_string()).or_default();
            stats.count += 1;
            stats.hits += entry.hit_count;
        }

        let mut ranked: Vec<&CacheEntry> = entries.iter().filter(|e| e.hit_count > 0).collect();
        ranked.sort_by(|a, b| b.hit_count.cmp(&a.hit_count).then(a.query.cmp(&b.query)));
        let top_queries = ranked
            .into_iter()
            .take(TOP_QUERIES_LIMIT)
            .map(|e| TopQuery {
                query: e.query.chars().take(QUERY_PREFIX_LEN).collect(),
                hits: e.hit_count,
                kind: e.kind,
            })
            .collect();

        Ok(CacheStatsReport {
            enabled: self.enabled(),
            total,
            active: total - expired,
            expired,
            total_hits,
            by_kind,
            top_queries,
        })
    }
}

/// Per-kind entry and hit counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct KindStats {
    pub count: usize,
    pub hits: u64,
}

/// One row of the top-queries report.
#[derive(Debug, Clone, Serialize)]
pub struct TopQuery {
    pub query: String,
    pub hits: u64,
    pub kind: RequestKind,
}

/// Snapshot of cache health for the admin surface.
#[derive(Debug, Serialize)]
pub struct CacheStatsReport {
    /// Whether get/put are active; admin operations work either way.
    pub enabled: bool,
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub total_hits: u64,
    pub by_kind: BTreeMap<String, KindStats>,
    pub top_queries: Vec<TopQuery>,
}
