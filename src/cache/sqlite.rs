//! Durable SQLite cache storage.
//!
//! One row per key with `INSERT OR REPLACE` upsert, so a write fully
//! reflects a single writer. The connection lives behind a tokio mutex and
//! is acquired per operation; the guard is released on every exit path,
//! including errors, so a failed operation cannot starve other requests.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::error::{CrumbError, Result};

use super::store::{CacheEntry, CacheStorage};

/// Durable storage backend.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Private database, handy for tests that want real SQL without a file.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS response_cache (
                key        TEXT PRIMARY KEY,
                kind       TEXT NOT NULL,
                query      TEXT NOT NULL,
                payload    TEXT NOT NULL,
                variant    TEXT,
                hit_count  INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_rc_expires ON response_cache(expires_at);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(CacheEntry, String, String)> {
        let kind_text: String = row.get(1)?;
        let payload_text: String = row.get(3)?;
        let entry = CacheEntry {
            key: row.get(0)?,
            // kind/payload are parsed by the caller so parse failures map to
            // CrumbError::Storage rather than a rusqlite error.
            kind: super::store::RequestKind::Ask,
            query: row.get(2)?,
            payload: serde_json::Value::Null,
            variant: row.get(4)?,
            hit_count: row.get::<_, i64>(5)? as u64,
            created_at: row.get(6)?,
            expires_at: row.get(7)?,
        };
        Ok((entry, kind_text, payload_text))
    }

    fn finish_entry(parts: (CacheEntry, String, String)) -> Result<CacheEntry> {
        let (mut entry, kind_text, payload_text) = parts;
        entry.kind = kind_text
            .parse()
            .map_err(|e: String| CrumbError::Storage(format!("corrupt kind column: {e}")))?;
        entry.payload = serde_json::from_str(&payload_text)
            .map_err(|e| CrumbError::Storage(format!("corrupt payload column: {e}")))?;
        Ok(entry)
    }
}

#[async_trait]
impl CacheStorage for SqliteStore {
    async fn fetch(&self, key: &str, now: i64) -> Result<Option<CacheEntry>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT key, kind, query, payload, variant, hit_count, created_at, expires_at
                 FROM response_cache
                 WHERE key = ?1 AND expires_at > ?2",
                params![key, now],
                Self::row_to_entry,
            )
            .optional()?;

        let Some(parts) = row else {
            return Ok(None);
        };
        let mut entry = Self::finish_entry(parts)?;

        // Same lock as the read, so the read-then-increment pair is a
        // single logical unit per key.
        conn.execute(
            "UPDATE response_cache SET hit_count = hit_count + 1 WHERE key = ?1",
            params![key],
        )?;
        entry.hit_count += 1;
        Ok(Some(entry))
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let payload_text = serde_json::to_string(&entry.payload)
            .map_err(|e| CrumbError::Storage(format!("unserializable payload: {e}")))?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO response_cache
             (key, kind, query, payload, variant, hit_count, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.key,
                entry.kind.to_string(),
                entry.query,
                payload_text,
                entry.variant,
                entry.hit_count as i64,
                entry.created_at,
                entry.expires_at,
            ],
        )?;
        Ok(())
    }

    async fn sweep(&self, now: i64) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM response_cache WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(deleted as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM response_cache", [])?;
        Ok(deleted as u64)
    }

    async fn snapshot(&self) -> Result<Vec<CacheEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT key, kind, query, payload, variant, hit_count, created_at, expires_at
             FROM response_cache",
        )?;
        let rows = stmt.query_map([], Self::row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(Self::finish_entry(row?)?);
        }
        Ok(entries)
    }
}
