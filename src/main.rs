//! crumb server binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crumb::api::server::{build_router, AppState};
use crumb::cache::{CacheStorage, MemoryStore, ResponseCache, SqliteStore};
use crumb::config::{CacheConfig, ServerConfig};
use crumb::feedback::{FeedbackSink, MemoryFeedback, SqliteFeedback};
use crumb::prompts::RandomPicker;
use crumb::providers::anthropic::{AnthropicProvider, DEFAULT_MODEL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crumb=info,tower_http=info")),
        )
        .init();

    let server_config = ServerConfig::from_env().context("loading server configuration")?;
    let cache_config = CacheConfig::from_env();

    let (storage, feedback): (Arc<dyn CacheStorage>, Arc<dyn FeedbackSink>) =
        match &server_config.db_path {
            Some(path) => {
                info!(path = %path.display(), "using SQLite storage");
                (
                    Arc::new(SqliteStore::open(path).context("opening cache database")?),
                    Arc::new(SqliteFeedback::open(path).context("opening feedback table")?),
                )
            }
            None => {
                info!("no CRUMB_DB_PATH set, using in-memory storage");
                (Arc::new(MemoryStore::new()), Arc::new(MemoryFeedback::new()))
            }
        };

    let state = AppState {
        cache: Arc::new(ResponseCache::new(storage, cache_config)),
        provider: Arc::new(AnthropicProvider::new(&server_config.api_key, DEFAULT_MODEL)),
        feedback,
        picker: Arc::new(RandomPicker),
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.port))
        .await
        .with_context(|| format!("binding port {}", server_config.port))?;
    info!(port = server_config.port, "crumb API listening");
    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
