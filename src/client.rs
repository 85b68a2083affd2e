// src/client.rs

//! HTTP client for the run API, and the cooperative polling loop.

use std::time::Duration;

use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::engine::LaunchReceipt;
use crate::errors::{Result, RuntrackError};
use crate::run::RunStatus;

/// Parsed body of `GET /api/runs/status`.
///
/// Pipeline-specific fields end up in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<RunStatus>,
    pub run_id: String,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub log_excerpt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusReply {
    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(RunStatus::is_terminal)
    }
}

#[derive(Debug, Clone)]
pub struct RunClient {
    http: reqwest::Client,
    base_url: String,
}

impl RunClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("runtrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/runs`.
    pub async fn submit(&self, params: &Map<String, Value>) -> Result<LaunchReceipt> {
        let url = format!("{}/api/runs", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "params": params }))
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let receipt = response
            .json::<LaunchReceipt>()
            .await
            .context("decoding launch receipt")?;
        Ok(receipt)
    }

    /// `GET /api/runs/status?runId=...`.
    pub async fn status(&self, run_id: &str) -> Result<StatusReply> {
        let url = format!("{}/api/runs/status", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("runId", run_id)])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let reply = response
            .json::<StatusReply>()
            .await
            .context("decoding status reply")?;
        Ok(reply)
    }

    /// Poll `status` every `interval` until the run reaches `complete` or
    /// `failed`, calling `on_update` with every successful reply.
    ///
    /// The first poll happens immediately. Transport failures and server
    /// errors are logged and retried on the next tick. Input errors (unknown
    /// run, missing id, rejected request) end the loop with that error.
    pub async fn wait_for_terminal<F>(
        &self,
        run_id: &str,
        interval: Duration,
        mut on_update: F,
    ) -> Result<StatusReply>
    where
        F: FnMut(&StatusReply),
    {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.status(run_id).await {
                Ok(reply) => {
                    debug!(run_id, status = ?reply.status, "polled run status");
                    on_update(&reply);
                    if reply.is_terminal() {
                        return Ok(reply);
                    }
                }
                Err(e @ RuntrackError::Other(_)) => {
                    warn!(run_id, error = %e, "status poll failed; retrying")
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map an error response back onto the crate's error taxonomy.
async fn error_from_response(response: reqwest::Response) -> RuntrackError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();
    let detail = body.get("error").and_then(Value::as_str);

    match status {
        StatusCode::BAD_REQUEST if message.contains("Run ID is required") => {
            RuntrackError::MissingRunId
        }
        StatusCode::BAD_REQUEST => RuntrackError::InvalidParams(message),
        StatusCode::NOT_FOUND => RuntrackError::RunNotFound(
            body.get("runId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => RuntrackError::Other(anyhow!(
            "server returned {status}: {message}{}",
            detail.map(|d| format!(" ({d})")).unwrap_or_default()
        )),
    }
}
