//! HTTP mapping for [`ServeError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ServeError;

/// A [`ServeError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ServeError);

impl From<ServeError> for ApiError {
    fn from(value: ServeError) -> Self {
        ApiError(value)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServeError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            ServeError::InvalidRequest(_) | ServeError::NotInitialized => self.0.to_string(),
            other => {
                tracing::error!(detail = %other, "Inference failed");
                "Inference failed. Check server logs for details.".to_string()
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
