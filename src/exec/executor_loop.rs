// src/exec/executor_loop.rs

//! Main executor loop that starts pipeline processes.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use crate::config::LauncherSection;
use crate::exec::launch_runner::run_launch;
use crate::fs::FileSystem;

use super::backend::LaunchRequest;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<LaunchRequest>` is what `RealLaunchBackend`
/// reserves slots on. Its capacity is `queue_length`, which bounds how many
/// accepted launches can wait for a process slot.
///
/// The loop takes one of the `max_concurrent` semaphore permits before it
/// pulls the next request, so waiting launches stay in the channel and count
/// against `queue_length`. Each request then runs in its own Tokio task that
/// holds the permit until the pipeline process exits.
pub fn spawn_executor(
    launcher: Arc<LauncherSection>,
    fs: Arc<dyn FileSystem>,
) -> mpsc::Sender<LaunchRequest> {
    let (tx, mut rx) = mpsc::channel::<LaunchRequest>(launcher.queue_length);
    let limiter = Arc::new(Semaphore::new(launcher.max_concurrent));

    tokio::spawn(async move {
        info!(
            max_concurrent = launcher.max_concurrent,
            queue_length = launcher.queue_length,
            "executor loop started"
        );

        loop {
            let permit = match Arc::clone(&limiter).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed; never happens while we own it
            };
            let Some(request) = rx.recv().await else {
                break;
            };

            debug!(
                run_id = %request.run_id,
                available = limiter.available_permits(),
                "process slot acquired"
            );

            let launcher = Arc::clone(&launcher);
            let fs = Arc::clone(&fs);
            tokio::spawn(async move {
                run_launch(request, launcher, fs).await;
                drop(permit);
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
