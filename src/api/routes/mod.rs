//! API route handlers.

pub mod admin;
pub mod ask;
pub mod feedback;
pub mod guide;
pub mod health;
pub mod recipe;

use std::sync::Arc;

use serde_json::Value;

use crate::api::server::AppState;
use crate::cache::RequestKind;
use crate::error::{CrumbError, Result};
use crate::payload::parse_structured;
use crate::providers::CompletionRequest;
use crate::sanitize::sanitize;

/// Shared sanitize-then-reject-empty gate for request fields.
pub(crate) fn gate_input(
    raw: &str,
    max_length: usize,
    field: &str,
    empty_message: &str,
) -> Result<String> {
    let text = sanitize(raw, max_length, field)?;
    if text.trim().is_empty() {
        return Err(CrumbError::invalid_input(field, empty_message));
    }
    Ok(text)
}

/// Cache-or-fill flow for the structured kinds (recipe/technique/
/// troubleshoot): look up by derived key; on miss call the upstream, parse
/// the JSON object, apply `shape`, store, and return it. The bool is the
/// cache-hit marker.
///
/// Two concurrent misses on the same key may both reach the upstream and
/// both write; last writer wins. Tolerated duplicate work, not a bug.
pub(crate) async fn cached_structured(
    state: &Arc<AppState>,
    kind: RequestKind,
    query: &str,
    prompt: String,
    max_tokens: u32,
    shape: impl FnOnce(Value) -> Value,
) -> Result<(Value, bool)> {
    let key = state.cache.key_for(kind, query);

    if let Some(entry) = state.cache.get(&key).await {
        return Ok((entry.payload, true));
    }

    let text = state
        .provider
        .complete(CompletionRequest {
            max_tokens,
            system: None,
            user_text: prompt,
        })
        .await?;

    let payload = shape(parse_structured(&text)?);
    state
        .cache
        .put(&key, kind, query, payload.clone(), None, state.cache.ttl_for(kind))
        .await;

    Ok((payload, false))
}

/// Attach the cache-hit marker to an outgoing structured payload. The
/// marker is response metadata, never part of the stored payload.
pub(crate) fn with_cache_marker(mut payload: Value, cached: bool) -> Value {
    if let Some(map) = payload.as_object_mut() {
        map.insert("cached".to_string(), Value::Bool(cached));
    }
    payload
}
