//! Request handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::error::ApiResult;
use crate::error::ServeError;
use crate::handler::{InvocationResponse, ModelHandler};
use crate::pipelines::classification::PipelineLoader;

/// `POST /invocations`. The body is parsed as JSON whatever its content type.
pub async fn invocations<L: PipelineLoader>(
    State(handler): State<Arc<ModelHandler<L>>>,
    body: Bytes,
) -> ApiResult<Json<InvocationResponse>> {
    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| ServeError::InvalidRequest(format!("Body is not valid JSON: {e}")))?;
    debug!(body = %data, "body");

    let start = Instant::now();
    let output = tokio::task::spawn_blocking(move || handler.handle(data))
        .await
        .map_err(ServeError::from)??;
    let elapsed = start.elapsed();

    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        "model execution took {:.2} seconds",
        elapsed.as_secs_f64()
    );
    info!(output = ?output.predictions, "output");

    Ok(Json(output))
}

/// `GET /ping`: 200 once the model is loaded, 404 before.
pub async fn ping<L: PipelineLoader>(State(handler): State<Arc<ModelHandler<L>>>) -> Response {
    let status = if handler.is_initialized() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    (status, [(header::CONTENT_TYPE, "application/json")], "ping!").into_response()
}
