//! User feedback recording for offline prompt-variant comparison.
//!
//! Append-only: the service records rows, aggregation happens offline.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use crate::cache::RequestKind;
use crate::error::Result;

/// One recorded piece of feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    pub kind: RequestKind,
    pub query: String,
    /// Prompt variant the rated response came from.
    pub variant: Option<String>,
    pub helpful: bool,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Destination for feedback rows.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn record(&self, entry: FeedbackEntry) -> Result<()>;
    async fn count(&self) -> Result<u64>;
}

/// Non-durable sink for tests.
#[derive(Debug, Default)]
pub struct MemoryFeedback {
    entries: Mutex<Vec<FeedbackEntry>>,
}

impl MemoryFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded entries, for test assertions.
    pub async fn entries(&self) -> Vec<FeedbackEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl FeedbackSink for MemoryFeedback {
    async fn record(&self, entry: FeedbackEntry) -> Result<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.lock().await.len() as u64)
    }
}

/// Durable sink sharing the cache database file (own connection, own table).
pub struct SqliteFeedback {
    conn: Mutex<Connection>,
}

impl SqliteFeedback {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             CREATE TABLE IF NOT EXISTS feedback (
                id         TEXT PRIMARY KEY,
                kind       TEXT NOT NULL,
                query      TEXT NOT NULL,
                variant    TEXT,
                helpful    INTEGER NOT NULL,
                comment    TEXT,
                created_at INTEGER NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl FeedbackSink for SqliteFeedback {
    async fn record(&self, entry: FeedbackEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO feedback (id, kind, query, variant, helpful, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id,
                entry.kind.to_string(),
                entry.query,
                entry.variant,
                entry.helpful as i64,
                entry.comment,
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
