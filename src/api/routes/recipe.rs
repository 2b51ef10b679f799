//! Structured recipe generation route.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::cache::RequestKind;
use crate::config::MAX_NAME_LENGTH;
use crate::error::Result;
use crate::prompts::{recipe_prompt, RECIPE_MAX_TOKENS};

use super::{cached_structured, gate_input, with_cache_marker};

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub bread_name: String,
}

pub async fn recipe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecipeRequest>,
) -> Result<Json<Value>> {
    let bread_name = gate_input(
        &request.bread_name,
        MAX_NAME_LENGTH,
        "bread_name",
        "Bread name cannot be empty",
    )?;

    let prompt = recipe_prompt(&bread_name);
    let name = bread_name.clone();
    let (payload, cached) = cached_structured(
        &state,
        RequestKind::Recipe,
        &bread_name,
        prompt,
        RECIPE_MAX_TOKENS,
        move |value| apply_recipe_defaults(value, &name),
    )
    .await?;

    Ok(Json(with_cache_marker(payload, cached)))
}

/// Fill missing recipe fields with the documented defaults so the client
/// always receives a complete object.
fn apply_recipe_defaults(mut payload: Value, bread_name: &str) -> Value {
    let defaults = [
        ("name", json!(bread_name)),
        ("description", json!("A delicious homemade bread")),
        ("prep_time", json!("30 min")),
        ("ferment_time", json!("N/A")),
        ("bake_time", json!("45 min")),
        ("difficulty", json!("Medium")),
        ("ingredients", json!([])),
        ("instructions", json!([])),
        ("tips", json!("Enjoy your fresh bread!")),
    ];
    if let Some(map) = payload.as_object_mut() {
        for (field, default) in defaults {
            map.entry(field).or_insert(default);
        }
    }
    payload
}
