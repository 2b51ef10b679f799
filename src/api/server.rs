//! Axum server wiring for the crumb API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::ResponseCache;
use crate::feedback::FeedbackSink;
use crate::prompts::VariantPicker;
use crate::providers::TextCompletion;

/// Shared state for all API handlers.
pub struct AppState {
    pub cache: Arc<ResponseCache>,
    pub provider: Arc<dyn TextCompletion>,
    pub feedback: Arc<dyn FeedbackSink>,
    pub picker: Arc<dyn VariantPicker>,
}

/// Build the axum router with all API routes.
///
/// CORS is wide open — the original mobile client calls from arbitrary
/// origins. The admin routes carry no authorization (known gap).
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(super::routes::health::root))
        .route("/health", get(super::routes::health::health))
        .route("/ask", post(super::routes::ask::ask))
        .route("/recipe", post(super::routes::recipe::recipe))
        .route("/technique", post(super::routes::guide::technique))
        .route("/troubleshoot", post(super::routes::guide::troubleshoot))
        .route("/feedback", post(super::routes::feedback::submit))
        .route("/admin/cache/stats", get(super::routes::admin::stats))
        .route("/admin/cache/sweep", post(super::routes::admin::sweep))
        .route("/admin/cache/clear", post(super::routes::admin::clear))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}
