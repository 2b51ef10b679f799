//! Operator-facing cache administration routes.
//!
//! No authorization — deploy behind a trusted boundary (known gap carried
//! over from the original service).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::api::server::AppState;
use crate::cache::CacheStatsReport;
use crate::error::Result;

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<CacheStatsReport>> {
    Ok(Json(state.cache.stats().await?))
}

pub async fn sweep(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let deleted = state.cache.sweep_expired().await?;
    info!(deleted, "cache sweep");
    Ok(Json(json!({ "deleted": deleted })))
}

/// Destructive: drops every entry, live or expired.
pub async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let deleted = state.cache.clear_all().await?;
    info!(deleted, "cache cleared");
    Ok(Json(json!({ "deleted": deleted })))
}
