//! Free-form bread question route.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::server::AppState;
use crate::cache::RequestKind;
use crate::config::MAX_QUERY_LENGTH;
use crate::error::Result;
use crate::prompts::{ASK_MAX_TOKENS, ASK_VARIANTS};
use crate::providers::CompletionRequest;

use super::gate_input;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    /// Cache-hit marker.
    pub cached: bool,
    /// Label of the prompt variant that produced the answer.
    pub variant: Option<String>,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let query = gate_input(&request.query, MAX_QUERY_LENGTH, "query", "Query cannot be empty")?;

    let key = state.cache.key_for(RequestKind::Ask, &query);
    if let Some(entry) = state.cache.get(&key).await {
        let response = entry.payload["response"].as_str().unwrap_or_default().to_string();
        return Ok(Json(AskResponse {
            response,
            cached: true,
            variant: entry.variant,
        }));
    }

    let variant = &ASK_VARIANTS[state.picker.pick(ASK_VARIANTS.len())];
    let response = state
        .provider
        .complete(CompletionRequest {
            max_tokens: ASK_MAX_TOKENS,
            system: Some(variant.system.to_string()),
            user_text: query.clone(),
        })
        .await?;

    state
        .cache
        .put(
            &key,
            RequestKind::Ask,
            &query,
            json!({ "response": response }),
            Some(variant.label),
            state.cache.ttl_for(RequestKind::Ask),
        )
        .await;

    Ok(Json(AskResponse {
        response,
        cached: false,
        variant: Some(variant.label.to_string()),
    }))
}
