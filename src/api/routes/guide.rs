//! Technique explanation and troubleshooting routes.
//!
//! Both follow the structured cache-or-fill flow with their own kinds, so
//! "how do I laminate" as a technique and as a troubleshoot never share a
//! cache entry.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::server::AppState;
use crate::cache::RequestKind;
use crate::config::MAX_NAME_LENGTH;
use crate::error::Result;
use crate::prompts::{technique_prompt, troubleshoot_prompt, GUIDE_MAX_TOKENS};

use super::{cached_structured, gate_input, with_cache_marker};

#[derive(Debug, Deserialize)]
pub struct TechniqueRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct TroubleshootRequest {
    #[serde(default)]
    pub problem: String,
}

pub async fn technique(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TechniqueRequest>,
) -> Result<Json<Value>> {
    let topic = gate_input(&request.topic, MAX_NAME_LENGTH, "topic", "Topic cannot be empty")?;
    let (payload, cached) = cached_structured(
        &state,
        RequestKind::Technique,
        &topic,
        technique_prompt(&topic),
        GUIDE_MAX_TOKENS,
        |value| value,
    )
    .await?;
    Ok(Json(with_cache_marker(payload, cached)))
}

pub async fn troubleshoot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TroubleshootRequest>,
) -> Result<Json<Value>> {
    let problem = gate_input(
        &request.problem,
        MAX_NAME_LENGTH,
        "problem",
        "Problem description cannot be empty",
    )?;
    let (payload, cached) = cached_structured(
        &state,
        RequestKind::Troubleshoot,
        &problem,
        troubleshoot_prompt(&problem),
        GUIDE_MAX_TOKENS,
        |value| value,
    )
    .await?;
    Ok(Json(with_cache_marker(payload, cached)))
}
