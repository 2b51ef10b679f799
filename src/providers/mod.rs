//! Upstream text-completion providers.
//!
//! The core treats the LLM as an opaque text-completion service behind
//! [`TextCompletion`]. Failures are surfaced with the connectivity /
//! rate-limit / service taxonomy and are never retried at this layer —
//! retry policy belongs to the caller.

pub mod anthropic;

use async_trait::async_trait;

use crate::error::Result;

pub use anthropic::AnthropicProvider;

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Optional system instructions.
    pub system: Option<String>,
    /// Sanitized user text.
    pub user_text: String,
}

/// Opaque text-completion service.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Generate text for the request, or fail with
    /// [`crate::error::CrumbError::Connectivity`] /
    /// [`crate::error::CrumbError::RateLimit`] /
    /// [`crate::error::CrumbError::Service`].
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
