//! Feedback submission route.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::cache::RequestKind;
use crate::config::MAX_QUERY_LENGTH;
use crate::error::Result;
use crate::feedback::FeedbackEntry;
use crate::sanitize::sanitize;

use super::gate_input;

/// Free-text comments get a tighter budget than queries.
const MAX_COMMENT_LENGTH: usize = 300;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub kind: RequestKind,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub helpful: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Value>> {
    let query = gate_input(&request.query, MAX_QUERY_LENGTH, "query", "Query cannot be empty")?;
    let comment = match request.comment.as_deref() {
        Some(raw) => {
            let cleaned = sanitize(raw, MAX_COMMENT_LENGTH, "comment")?;
            (!cleaned.is_empty()).then_some(cleaned)
        }
        None => None,
    };

    let entry = FeedbackEntry {
        id: uuid::Uuid::new_v4().to_string(),
        kind: request.kind,
        query,
        variant: request.variant,
        helpful: request.helpful,
        comment,
        created_at: chrono::Utc::now().timestamp(),
    };
    let id = entry.id.clone();
    state.feedback.record(entry).await?;

    Ok(Json(json!({ "id": id, "status": "recorded" })))
}
