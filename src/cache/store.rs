//! Cache entry model and the pluggable storage contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The category of request that partitions the cache key space. Identical
/// text under different kinds never collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Ask,
    Recipe,
    Technique,
    Troubleshoot,
}

impl RequestKind {
    /// All kinds, for stats aggregation.
    pub fn all() -> [RequestKind; 4] {
        [Self::Ask, Self::Recipe, Self::Technique, Self::Troubleshoot]
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Recipe => write!(f, "recipe"),
            Self::Technique => write!(f, "technique"),
            Self::Troubleshoot => write!(f, "troubleshoot"),
        }
    }
}

impl std::str::FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "recipe" => Ok(Self::Recipe),
            "technique" => Ok(Self::Technique),
            "troubleshoot" => Ok(Self::Troubleshoot),
            _ => Err(format!(
                "unknown request kind: '{s}' (expected ask/recipe/technique/troubleshoot)"
            )),
        }
    }
}

/// A single cached upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Deterministic key from `(kind, normalized query)`.
    pub key: String,
    pub kind: RequestKind,
    /// Original normalized query text, kept for diagnostics and the
    /// top-queries report.
    pub query: String,
    /// Full response body, replayed verbatim on hit.
    pub payload: Value,
    /// Label of the prompt variant that produced the payload.
    pub variant: Option<String>,
    /// Incremented by exactly 1 on every successful read.
    pub hit_count: u64,
    /// Unix timestamp of insertion.
    pub created_at: i64,
    /// Unix timestamp after which the entry is invisible to reads.
    pub expires_at: i64,
}

impl CacheEntry {
    /// Expired entries are logically invisible even before a sweep purges
    /// them. A zero TTL expires immediately.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Time source, injected so expiry can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall-clock time in unix seconds.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Storage contract for cache entries.
///
/// Both implementations must behave identically: atomic upsert-by-key,
/// expiry-filtered reads with hit-count increment, idempotent sweep. A
/// returned entry is always fully consistent — never a partial write.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Return the live (non-expired) entry for `key`, incrementing its hit
    /// count as a single logical unit. The returned entry reflects the
    /// post-increment count. Absence is a normal outcome, not an error.
    async fn fetch(&self, key: &str, now: i64) -> Result<Option<CacheEntry>>;

    /// Insert or fully replace the entry at `entry.key`.
    async fn upsert(&self, entry: CacheEntry) -> Result<()>;

    /// Delete every expired entry; return how many were removed.
    async fn sweep(&self, now: i64) -> Result<u64>;

    /// Unconditionally delete every entry; return how many were removed.
    async fn clear(&self) -> Result<u64>;

    /// All entries, live and expired, for stats aggregation.
    async fn snapshot(&self) -> Result<Vec<CacheEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in RequestKind::all() {
            let parsed: RequestKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_kind_rejects_unknown() {
        assert!("weekly-challenge".parse::<RequestKind>().is_err());
    }

    #[test]
    fn test_zero_ttl_entry_is_expired() {
        let entry = CacheEntry {
            key: "k".into(),
            kind: RequestKind::Ask,
            query: "q".into(),
            payload: serde_json::json!({}),
            variant: None,
            hit_count: 0,
            created_at: 100,
            expires_at: 100,
        };
        assert!(entry.is_expired(100));
        assert!(!entry.is_expired(99));
    }
}
