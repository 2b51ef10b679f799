//! Environment-backed configuration.
//!
//! All settings are collected once at startup into plain structs that are
//! passed to components at construction time. Nothing reads the environment
//! after startup, which keeps the cache and sanitizer testable in isolation.

use crate::cache::RequestKind;
use crate::error::{CrumbError, Result};

/// Default TTLs per request kind, in seconds. Answers to open-ended
/// questions go stale faster than generated recipes.
const DEFAULT_TTL_ASK_SECS: i64 = 3_600;
const DEFAULT_TTL_RECIPE_SECS: i64 = 86_400;
const DEFAULT_TTL_TECHNIQUE_SECS: i64 = 86_400;
const DEFAULT_TTL_TROUBLESHOOT_SECS: i64 = 3_600;

const DEFAULT_PORT: u16 = 8000;

/// Maximum accepted length of a free-form question, in characters.
pub const MAX_QUERY_LENGTH: usize = 500;
/// Maximum accepted length of a bread name / topic, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Cache behavior knobs, passed into [`crate::cache::ResponseCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When `false`, `get` always misses and `put` is a no-op.
    pub enabled: bool,
    pub ttl_ask_secs: i64,
    pub ttl_recipe_secs: i64,
    pub ttl_technique_secs: i64,
    pub ttl_troubleshoot_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ask_secs: DEFAULT_TTL_ASK_SECS,
            ttl_recipe_secs: DEFAULT_TTL_RECIPE_SECS,
            ttl_technique_secs: DEFAULT_TTL_TECHNIQUE_SECS,
            ttl_troubleshoot_secs: DEFAULT_TTL_TROUBLESHOOT_SECS,
        }
    }
}

impl CacheConfig {
    /// Read cache settings from the environment, falling back to defaults.
    ///
    /// Recognized variables: `CACHE_ENABLED`, `CACHE_TTL_ASK_SECS`,
    /// `CACHE_TTL_RECIPE_SECS`, `CACHE_TTL_TECHNIQUE_SECS`,
    /// `CACHE_TTL_TROUBLESHOOT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_bool("CACHE_ENABLED", defaults.enabled),
            ttl_ask_secs: env_i64("CACHE_TTL_ASK_SECS", defaults.ttl_ask_secs),
            ttl_recipe_secs: env_i64("CACHE_TTL_RECIPE_SECS", defaults.ttl_recipe_secs),
            ttl_technique_secs: env_i64("CACHE_TTL_TECHNIQUE_SECS", defaults.ttl_technique_secs),
            ttl_troubleshoot_secs: env_i64(
                "CACHE_TTL_TROUBLESHOOT_SECS",
                defaults.ttl_troubleshoot_secs,
            ),
        }
    }

    /// TTL policy for a request kind, in seconds.
    pub fn ttl_for(&self, kind: RequestKind) -> i64 {
        match kind {
            RequestKind::Ask => self.ttl_ask_secs,
            RequestKind::Recipe => self.ttl_recipe_secs,
            RequestKind::Technique => self.ttl_technique_secs,
            RequestKind::Troubleshoot => self.ttl_troubleshoot_secs,
        }
    }
}

/// Server-level settings for the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Upstream provider API key.
    pub api_key: String,
    /// Path to the SQLite database file. `None` selects the in-memory store.
    pub db_path: Option<std::path::PathBuf>,
}

impl ServerConfig {
    /// Read server settings from the environment.
    ///
    /// `ANTHROPIC_API_KEY` is required; `PORT` and `CRUMB_DB_PATH` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CrumbError::Config("ANTHROPIC_API_KEY is not set".into()))?;
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let db_path = std::env::var("CRUMB_DB_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(std::path::PathBuf::from);
        Ok(Self {
            port,
            api_key,
            db_path,
        })
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
