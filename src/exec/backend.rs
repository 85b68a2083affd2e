// src/exec/backend.rs

//! Pluggable launch backend abstraction.
//!
//! The launcher talks to a `LaunchBackend` instead of spawning processes
//! itself. Launching is two-phase:
//!
//! 1. `reserve()` claims a place in the launch queue, failing fast with
//!    [`RuntrackError::QueueFull`] when the queue is saturated.
//! 2. The launcher writes the run's files, then hands the request to the
//!    returned [`LaunchSlot`], which cannot fail.
//!
//! - `RealLaunchBackend` is the production implementation: a bounded mpsc
//!   channel feeding the executor loop in [`executor_loop`].
//! - Tests can provide their own backend that records requests instead of
//!   starting processes.
//!
//! [`executor_loop`]: super::executor_loop

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, OwnedPermit, error::TrySendError};

use crate::config::LauncherSection;
use crate::errors::{Result, RuntrackError};
use crate::fs::FileSystem;
use crate::run::RunId;

use super::executor_loop::spawn_executor;

/// Everything the executor needs to start one pipeline process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub run_id: RunId,
    /// Host path of the run directory (where `launch_error.log` goes).
    pub run_dir: PathBuf,
    /// `{run_dir}` as the pipeline sees it.
    pub run_dir_arg: String,
    /// `{params_file}` as the pipeline sees it.
    pub params_file_arg: String,
}

/// A reserved place in the launch queue.
pub trait LaunchSlot: Send {
    fn dispatch(self: Box<Self>, request: LaunchRequest);
}

/// Trait abstracting how launch requests are executed.
pub trait LaunchBackend: Send + Sync {
    fn reserve(&self) -> Result<Box<dyn LaunchSlot>>;
}

impl LaunchSlot for OwnedPermit<LaunchRequest> {
    fn dispatch(self: Box<Self>, request: LaunchRequest) {
        (*self).send(request);
    }
}

/// Real launch backend used in production.
pub struct RealLaunchBackend {
    tx: mpsc::Sender<LaunchRequest>,
    queue_length: usize,
}

impl RealLaunchBackend {
    /// Create a new backend and spawn its executor loop immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(launcher: LauncherSection, fs: Arc<dyn FileSystem>) -> Self {
        let queue_length = launcher.queue_length;
        let tx = spawn_executor(Arc::new(launcher), fs);
        Self { tx, queue_length }
    }
}

impl LaunchBackend for RealLaunchBackend {
    fn reserve(&self) -> Result<Box<dyn LaunchSlot>> {
        match self.tx.clone().try_reserve_owned() {
            Ok(permit) => Ok(Box::new(permit)),
            Err(TrySendError::Full(_)) => Err(RuntrackError::QueueFull(self.queue_length)),
            Err(TrySendError::Closed(_)) => Err(RuntrackError::Other(anyhow::anyhow!(
                "launch executor is not running"
            ))),
        }
    }
}
