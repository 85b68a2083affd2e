// tests/http_api.rs
mod common;
use crate::common::{TestServer, init_tracing};

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use runtrack::errors::RuntrackError;
use runtrack::run::{RunLayout, RunStatus};
use runtrack_test_utils::builders::ConfigFileBuilder;
use runtrack_test_utils::fake_launcher::FakeLauncher;
use runtrack_test_utils::fake_pipeline::FakePipeline;
use runtrack_test_utils::with_timeout;

fn object(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn submit_then_status_reports_running_with_null_artifacts() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path())
        .pipeline_name("VisionX")
        .build();
    let backend = FakeLauncher::new();
    let server = TestServer::start(&cfg, Arc::new(backend.clone())).await;

    let receipt = server
        .client
        .submit(&object(json!({ "epochs": 4, "device": "cpu" })))
        .await
        .unwrap();
    assert_eq!(receipt.message, "VisionX pipeline started");
    assert_eq!(backend.launched().len(), 1);

    let body: Value = reqwest::get(server.url(&format!(
        "/api/runs/status?runId={}",
        receipt.run_id
    )))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    assert_eq!(
        body,
        json!({
            "status": "running",
            "runId": receipt.run_id.to_string(),
            "reportUrl": null,
            "logExcerpt": null,
        })
    );
}

#[tokio::test]
async fn status_errors_use_the_documented_bodies() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;

    let missing = reqwest::get(server.url("/api/runs/status")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.json::<Value>().await.unwrap(),
        json!({ "message": "Run ID is required" })
    );

    let unknown_id = "3b241101-e2bb-4255-8caf-4136c566a962";
    let unknown = reqwest::get(server.url(&format!("/api/runs/status?runId={unknown_id}")))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        unknown.json::<Value>().await.unwrap(),
        json!({ "message": "Run not found", "runId": unknown_id })
    );

    // Same taxonomy through the typed client.
    assert!(matches!(
        server.client.status(unknown_id).await,
        Err(RuntrackError::RunNotFound(id)) if id == unknown_id
    ));
    assert!(matches!(
        server.client.status("").await,
        Err(RuntrackError::MissingRunId)
    ));
}

#[tokio::test]
async fn malformed_status_file_is_a_server_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;
    let pipeline = FakePipeline::new(RunLayout::from_config(&cfg));

    let receipt = server.client.submit(&Map::new()).await.unwrap();
    pipeline.write_raw_status(&receipt.run_id, "not json");

    let response = reqwest::get(server.url(&format!(
        "/api/runs/status?runId={}",
        receipt.run_id
    )))
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], json!("Failed to get status"));
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn bad_submissions_are_rejected_before_anything_launches() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let backend = FakeLauncher::new();
    let server = TestServer::start(&cfg, Arc::new(backend.clone())).await;
    let http = reqwest::Client::new();

    let not_json = http
        .post(server.url("/api/runs"))
        .header("content-type", "application/json")
        .body("{ nope")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    let no_params = http
        .post(server.url("/api/runs"))
        .json(&json!({ "other": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_params.status(), StatusCode::BAD_REQUEST);

    let nested = http
        .post(server.url("/api/runs"))
        .json(&json!({ "params": { "model": { "depth": 3 } } }))
        .send()
        .await
        .unwrap();
    assert_eq!(nested.status(), StatusCode::BAD_REQUEST);
    let body: Value = nested.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("model"));

    assert!(backend.launched().is_empty());
}

#[tokio::test]
async fn full_queue_is_service_unavailable() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::with_capacity(0))).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/runs"))
        .json(&json!({ "params": { "epochs": 1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], json!("Failed to start pipeline"));
}

#[tokio::test]
async fn finished_run_reports_are_served_statically() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;
    let pipeline = FakePipeline::new(RunLayout::from_config(&cfg));

    let receipt = server.client.submit(&Map::new()).await.unwrap();
    pipeline.complete(&receipt.run_id, &["done"]);

    let reply = server
        .client
        .status(&receipt.run_id.to_string())
        .await
        .unwrap();
    assert_eq!(reply.status, Some(RunStatus::Complete));
    let report_url = reply.report_url.expect("report url once the report exists");

    let page = reqwest::get(server.url(&report_url)).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains(&receipt.run_id.to_string()));
}

#[tokio::test]
async fn client_polls_until_the_run_fails() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;
    let layout = RunLayout::from_config(&cfg);

    let receipt = server.client.submit(&Map::new()).await.unwrap();
    let run_id = receipt.run_id;

    let finisher = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let pipeline = FakePipeline::new(layout);
        pipeline.append_log(&run_id, &["CUDA out of memory"]);
        pipeline.set_status(&run_id, "failed");
    });

    let mut seen = Vec::new();
    let reply = with_timeout(server.client.wait_for_terminal(
        &run_id.to_string(),
        Duration::from_millis(25),
        |r| seen.push(r.status.clone()),
    ))
    .await
    .unwrap();
    finisher.await.unwrap();

    assert_eq!(reply.status, Some(RunStatus::Failed));
    assert_eq!(reply.log_excerpt.as_deref(), Some("CUDA out of memory\n"));
    assert_eq!(seen.first(), Some(&Some(RunStatus::Running)));
    assert_eq!(seen.last(), Some(&Some(RunStatus::Failed)));
}

#[tokio::test]
async fn event_stream_pushes_changes_and_closes_on_completion() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path())
        .push_interval(Duration::from_millis(20))
        .build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;
    let layout = RunLayout::from_config(&cfg);

    let receipt = server.client.submit(&Map::new()).await.unwrap();
    let run_id = receipt.run_id;

    let finisher = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        FakePipeline::new(layout).complete(&run_id, &["all good"]);
    });

    let response = reqwest::get(server.url(&format!("/api/runs/{run_id}/events")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // `text()` only returns once the server ends the stream.
    let text = with_timeout(response.text()).await.unwrap();
    finisher.await.unwrap();

    assert!(text.matches("event: status").count() >= 2, "{text}");
    assert!(text.contains("\"running\""));
    assert!(text.contains("\"complete\""));
    assert!(text.contains(&format!("/reports/{run_id}.html")));
}

#[tokio::test]
async fn event_stream_for_unknown_run_is_not_found() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;

    let response = reqwest::get(server.url("/api/runs/not-a-run/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_answers() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;

    let body = reqwest::get(server.url("/healthz"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn watching_an_unknown_run_stops_at_the_first_reply() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::in_dir(dir.path()).build();
    let server = TestServer::start(&cfg, Arc::new(FakeLauncher::new())).await;

    let unknown_id = "3b241101-e2bb-4255-8caf-4136c566a962";
    let mut updates = 0;
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        server
            .client
            .wait_for_terminal(unknown_id, Duration::from_millis(50), |_| updates += 1),
    )
    .await
    .expect("an unknown run must not be polled forever");

    assert!(matches!(
        result,
        Err(RuntrackError::RunNotFound(id)) if id == unknown_id
    ));
    assert_eq!(updates, 0);

    let blank = with_timeout(server.client.wait_for_terminal(
        "",
        Duration::from_millis(50),
        |_| {},
    ))
    .await;
    assert!(matches!(blank, Err(RuntrackError::MissingRunId)));
}
