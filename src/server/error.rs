// src/server/error.rs

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::errors::RuntrackError;

/// A `RuntrackError` on its way out of an HTTP handler.
///
/// `context` is the summary shown for server-side failures
/// (e.g. "Failed to start pipeline"); the underlying error text is attached
/// as `error` so callers can diagnose it.
#[derive(Debug)]
pub struct ApiError {
    context: &'static str,
    source: RuntrackError,
}

impl ApiError {
    pub fn new(context: &'static str, source: RuntrackError) -> Self {
        Self { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.source {
            RuntrackError::MissingRunId | RuntrackError::InvalidParams(_) => {
                StatusCode::BAD_REQUEST
            }
            RuntrackError::RunNotFound(_) => StatusCode::NOT_FOUND,
            RuntrackError::QueueFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            RuntrackError::ConfigError(_)
            | RuntrackError::IoError(_)
            | RuntrackError::TomlError(_)
            | RuntrackError::StatusParse(_)
            | RuntrackError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self.source {
            RuntrackError::MissingRunId | RuntrackError::InvalidParams(_) => {
                json!({ "message": self.source.to_string() })
            }
            RuntrackError::RunNotFound(run_id) => {
                json!({ "message": "Run not found", "runId": run_id })
            }
            other => {
                if status.is_server_error() {
                    error!(context = self.context, error = %format!("{other:#}"), "request failed");
                }
                json!({ "message": self.context, "error": format!("{other:#}") })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_classes() {
        let cases = [
            (RuntrackError::MissingRunId, StatusCode::BAD_REQUEST),
            (
                RuntrackError::InvalidParams("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RuntrackError::RunNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (RuntrackError::QueueFull(4), StatusCode::SERVICE_UNAVAILABLE),
            (
                RuntrackError::StatusParse("eof".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RuntrackError::Other(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::new("Failed", err).status_code(), expected);
        }
    }
}
