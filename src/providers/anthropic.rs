//! Anthropic Messages API provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::{CrumbError, Result};

use super::{CompletionRequest, TextCompletion};

/// Anthropic REST API base.
const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

/// API version header value required by the Messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Provider that speaks the Anthropic Messages API directly.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: Self::build_client(),
        }
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Build a Messages API request body for a single user turn.
    pub fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": [{ "role": "user", "content": request.user_text }]
        });
        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        body
    }

    /// Extract generated text from a Messages API response: the
    /// concatenation of all `text` content blocks.
    pub fn extract_text(response: &Value) -> Option<String> {
        let blocks = response["content"].as_array()?;
        let text: Vec<&str> = blocks.iter().filter_map(|b| b["text"].as_str()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text.join(""))
        }
    }
}

#[async_trait]
impl TextCompletion for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = self.build_request_body(&request);

        debug!(model = %self.model, max_tokens = request.max_tokens, "upstream completion request");

        let response = self
            .client
            .post(format!("{ANTHROPIC_API_BASE}/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CrumbError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CrumbError::RateLimit);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CrumbError::Service {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let json: Value = response.json().await.map_err(|e| CrumbError::Service {
            status: status.as_u16(),
            message: format!("unparseable upstream response: {e}"),
        })?;

        Self::extract_text(&json).ok_or_else(|| CrumbError::Service {
            status: status.as_u16(),
            message: "upstream response contained no text content".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_includes_system_when_set() {
        let provider = AnthropicProvider::new("key", DEFAULT_MODEL);
        let body = provider.build_request_body(&CompletionRequest {
            max_tokens: 500,
            system: Some("You are a bread expert".into()),
            user_text: "What is sourdough?".into(),
        });
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["system"], "You are a bread expert");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "What is sourdough?");
    }

    #[test]
    fn test_request_body_omits_system_when_absent() {
        let provider = AnthropicProvider::new("key", DEFAULT_MODEL);
        let body = provider.build_request_body(&CompletionRequest {
            max_tokens: 1500,
            system: None,
            user_text: "recipe".into(),
        });
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_extract_text_joins_blocks() {
        let response = serde_json::json!({
            "content": [
                { "type": "text", "text": "Sourdough is " },
                { "type": "text", "text": "naturally leavened." }
            ]
        });
        assert_eq!(
            AnthropicProvider::extract_text(&response).unwrap(),
            "Sourdough is naturally leavened."
        );
    }

    #[test]
    fn test_extract_text_empty_content_is_none() {
        let response = serde_json::json!({ "content": [] });
        assert!(AnthropicProvider::extract_text(&response).is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = AnthropicProvider::new("sk-secret", DEFAULT_MODEL);
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
