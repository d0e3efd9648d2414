//! API route definitions

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::ServeConfig;
use crate::handler::ModelHandler;
use crate::pipelines::classification::PipelineLoader;

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Use POST /invocations or GET /ping.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed. /invocations takes POST, /ping takes GET.",
        })),
    )
}

/// Create the application router around a shared handler.
pub fn create_router<L: PipelineLoader>(
    handler: Arc<ModelHandler<L>>,
    config: &ServeConfig,
) -> Router {
    Router::new()
        .route("/invocations", post(handlers::invocations::<L>))
        .route("/ping", get(handlers::ping::<L>))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(handler)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
