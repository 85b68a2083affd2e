// src/server/mod.rs

//! HTTP surface.
//!
//! | Method | Path                      | Handler                   |
//! |--------|---------------------------|---------------------------|
//! | POST   | `/api/runs`               | [`routes::submit`]        |
//! | GET    | `/api/runs/status?runId=` | [`routes::status`]        |
//! | GET    | `/api/runs/:run_id/events`| [`events::stream_events`] |
//! | GET    | `<reports_url_prefix>/*`  | static report files       |
//! | GET    | `/healthz`                | liveness                  |

pub mod error;
pub mod events;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ConfigFile;
use crate::engine::{Launcher, Poller, Sweeper, spawn_sweeper};
use crate::exec::RealLaunchBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::run::RunLayout;

/// Shared, read-only handler state. Runs themselves live on disk.
#[derive(Debug, Clone)]
pub struct AppState {
    pub launcher: Arc<Launcher>,
    pub poller: Arc<Poller>,
    pub push_interval: Duration,
}

/// Build the router for the given state.
pub fn router(state: AppState, reports_dir: &Path, reports_url_prefix: &str) -> Router {
    let reports_mount = reports_url_prefix.trim_end_matches('/');

    Router::new()
        .route("/api/runs", post(routes::submit))
        .route("/api/runs/status", get(routes::status))
        .route("/api/runs/:run_id/events", get(events::stream_events))
        .route("/healthz", get(routes::healthz))
        .nest_service(reports_mount, ServeDir::new(reports_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the production components from a validated config.
pub fn build_state(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> AppState {
    let backend = Arc::new(RealLaunchBackend::new(cfg.launcher.clone(), Arc::clone(&fs)));
    let launcher = Launcher::from_config(cfg, Arc::clone(&fs), backend);
    let poller = Poller::new(
        RunLayout::from_config(cfg),
        fs,
        cfg.status.log_excerpt_lines,
    );

    AppState {
        launcher: Arc::new(launcher),
        poller: Arc::new(poller),
        push_interval: cfg.status.push_interval,
    }
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving HTTP")
}

/// `runtrack serve`: run the API until Ctrl-C.
pub async fn serve(cfg: ConfigFile, bind: Option<SocketAddr>) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let layout = RunLayout::from_config(&cfg);

    // Serving reports requires the directory to exist even before the first run.
    fs.create_dir_all(layout.work_dir())?;
    fs.create_dir_all(layout.reports_dir())?;

    let state = build_state(&cfg, Arc::clone(&fs));
    let app = router(
        state,
        layout.reports_dir(),
        &cfg.storage.reports_url_prefix,
    );

    let sweeper = cfg.retention.ttl.map(|ttl| {
        spawn_sweeper(
            Sweeper::new(layout.clone(), Arc::clone(&fs), ttl),
            cfg.retention.sweep_interval,
        )
    });

    let addr = bind.unwrap_or(cfg.server.bind);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        work_dir = %layout.work_dir().display(),
        reports_dir = %layout.reports_dir().display(),
        "runtrack listening"
    );

    let result = serve_on(listener, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    })
    .await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}
