// Uniform error envelope for the catalog API.
// Every failure surfaces as `{ "error": <reason> }` with status 400, matching
// what the frontend expects from the scraper endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required access credential is missing; nothing upstream was called.
    #[error("{0}")]
    Configuration(String),

    /// Channel or its uploads playlist could not be resolved.
    #[error("{0}")]
    NotFound(String),

    /// Failed or malformed upstream response.
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::NotFound("Channel not found".to_string())
    }

    pub fn api_key_missing() -> Self {
        AppError::Configuration("YouTube API key not configured".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The reason string goes out verbatim, no wrapping.
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(format!("YouTube API request failed: {}", e))
    }
}
