//! Shared helpers for runtrack's unit and integration tests.
//!
//! - [`builders::ConfigFileBuilder`] lays out a work/reports tree under a
//!   temp directory.
//! - [`fake_launcher::FakeLauncher`] records launches instead of spawning.
//! - [`fake_pipeline::FakePipeline`] writes run files the way a pipeline does.

pub mod builders;
pub mod fake_launcher;
pub mod fake_pipeline;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for anything a test waits on: polling loops, event streams,
/// child processes.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route runtrack's tracing output into the per-test capture.
///
/// Output shows up for failing tests only. `RUST_LOG` overrides the default
/// `runtrack=debug` filter, e.g. `RUST_LOG=runtrack=trace,tower_http=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,runtrack=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
