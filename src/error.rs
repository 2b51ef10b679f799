//! Error taxonomy for crumb.
//!
//! Sanitizer rejections are client-caused and terminal for the request.
//! Upstream faults propagate as-is with no retry at this layer. Storage
//! faults are swallowed fail-open at the cache boundary (see
//! [`crate::cache::ResponseCache`]) and only surface from admin operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CrumbError>;

/// All failure modes the crumb core can produce.
#[derive(Debug, Error)]
pub enum CrumbError {
    /// Input rejected by the sanitizer. `field` names the offending request
    /// field; `reason` is safe to echo back (it never contains the raw text).
    #[error("invalid input in '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// Upstream returned text that is not recoverable as the expected
    /// structured shape, even after fallback extraction.
    #[error("failed to parse structured payload: {0}")]
    PayloadParse(String),

    /// Could not reach the upstream LLM service.
    #[error("unable to connect to upstream service: {0}")]
    Connectivity(String),

    /// Upstream throttled the request (HTTP 429).
    #[error("upstream rate limit exceeded")]
    RateLimit,

    /// Upstream returned a non-success status other than 429.
    #[error("upstream service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The persistent cache or feedback store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Bad or missing configuration discovered at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CrumbError {
    /// Shorthand for a sanitizer rejection.
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for CrumbError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
