// src/server/routes.rs

use std::sync::Arc;

use anyhow::anyhow;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::engine::{LaunchReceipt, RunSnapshot};
use crate::errors::{self, RuntrackError};
use crate::run::RunParams;

use super::AppState;
use super::error::ApiError;

const LAUNCH_FAILED: &str = "Failed to start pipeline";
pub(crate) const STATUS_FAILED: &str = "Failed to get status";

/// Body of `POST /api/runs`.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// Query of `GET /api/runs/status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "runId")]
    pub run_id: Option<String>,
}

/// Start a pipeline run and return its id without waiting for it.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<LaunchReceipt>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        ApiError::new(
            LAUNCH_FAILED,
            RuntrackError::InvalidParams(rejection.body_text()),
        )
    })?;

    let params = body.params.ok_or_else(|| {
        ApiError::new(
            LAUNCH_FAILED,
            RuntrackError::InvalidParams("`params` must be a JSON object".to_string()),
        )
    })?;

    let params = RunParams::from_json(&params).map_err(|e| ApiError::new(LAUNCH_FAILED, e))?;

    let launcher = Arc::clone(&state.launcher);
    run_blocking(move || launcher.launch(&params))
        .await
        .map(Json)
        .map_err(|e| ApiError::new(LAUNCH_FAILED, e))
}

/// Current snapshot of a run.
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<RunSnapshot>, ApiError> {
    let poller = Arc::clone(&state.poller);
    run_blocking(move || poller.snapshot(query.run_id.as_deref()))
        .await
        .map(Json)
        .map_err(|e| ApiError::new(STATUS_FAILED, e))
}

/// Run file-system bound engine work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> errors::Result<T>
where
    F: FnOnce() -> errors::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RuntrackError::Other(anyhow!("blocking task failed: {e}")))?
}

pub async fn healthz() -> &'static str {
    "ok"
}
