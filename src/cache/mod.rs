//! Content-addressed response cache with TTL expiry and hit counting.
//!
//! Keys are derived deterministically from `(kind, normalized query)`; see
//! [`key::derive_key`]. Storage is pluggable behind [`CacheStorage`] with an
//! in-memory map and a durable SQLite store, both satisfying the same
//! contract. [`ResponseCache`] is the facade request handlers talk to.

pub mod key;
pub mod memory;
pub mod response_cache;
pub mod sqlite;
pub mod store;

pub use key::derive_key;
pub use memory::MemoryStore;
pub use response_cache::{CacheStatsReport, KindStats, ResponseCache, TopQuery};
pub use sqlite::SqliteStore;
pub use store::{CacheEntry, CacheStorage, Clock, RequestKind, SystemClock};
