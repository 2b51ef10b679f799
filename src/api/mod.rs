//! HTTP API surface: public question/recipe routes, feedback, and the
//! operator-facing cache admin routes.

pub mod routes;
pub mod server;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::CrumbError;

/// Map the error taxonomy onto HTTP statuses. The `detail` body field
/// mirrors the shape the iOS client already consumes.
impl IntoResponse for CrumbError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            CrumbError::InvalidInput { reason, .. } => (StatusCode::BAD_REQUEST, reason.clone()),
            CrumbError::RateLimit => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            CrumbError::Connectivity(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Unable to connect to AI service".to_string(),
            ),
            CrumbError::PayloadParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse AI response".to_string(),
            ),
            CrumbError::Service { status, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("AI service error (upstream status {status})"),
            ),
            CrumbError::Storage(_) | CrumbError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
