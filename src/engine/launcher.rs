// src/engine/launcher.rs

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{LaunchBackend, LaunchRequest, translate_path};
use crate::fs::FileSystem;
use crate::run::{RunId, RunLayout, RunParams, RunStatus};
use crate::types::PathStyle;

/// Response to a successful launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReceipt {
    pub run_id: RunId,
    pub message: String,
}

/// Creates runs and hands them to the launch backend.
pub struct Launcher {
    layout: RunLayout,
    path_style: PathStyle,
    pipeline_name: String,
    fs: Arc<dyn FileSystem>,
    backend: Arc<dyn LaunchBackend>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("layout", &self.layout)
            .field("path_style", &self.path_style)
            .field("pipeline_name", &self.pipeline_name)
            .finish_non_exhaustive()
    }
}

impl Launcher {
    pub fn new(
        layout: RunLayout,
        path_style: PathStyle,
        pipeline_name: impl Into<String>,
        fs: Arc<dyn FileSystem>,
        backend: Arc<dyn LaunchBackend>,
    ) -> Self {
        Self {
            layout,
            path_style,
            pipeline_name: pipeline_name.into(),
            fs,
            backend,
        }
    }

    pub fn from_config(
        cfg: &ConfigFile,
        fs: Arc<dyn FileSystem>,
        backend: Arc<dyn LaunchBackend>,
    ) -> Self {
        Self::new(
            RunLayout::from_config(cfg),
            cfg.launcher.path_style,
            cfg.launcher.name.clone(),
            fs,
            backend,
        )
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// Start a new run.
    ///
    /// Order of effects:
    /// 1. reserve a launch slot (fails with `QueueFull`, nothing on disk yet)
    /// 2. create the run directory and the shared reports directory
    /// 3. write `params.txt`
    /// 4. write the initial `status.json` (`running`) atomically
    /// 5. queue the pipeline process
    ///
    /// The initial status is in place before the pipeline can start, so the
    /// pipeline's own updates always win. Errors in steps 2-4 drop the slot
    /// and surface to the caller; anything that goes wrong once the process
    /// is queued only ends up in `launch_error.log`.
    pub fn launch(&self, params: &RunParams) -> Result<LaunchReceipt> {
        let slot = self.backend.reserve()?;

        let run_id = RunId::new();
        let run_dir = self.layout.run_dir(&run_id);

        self.fs.create_dir_all(&run_dir)?;
        self.fs.create_dir_all(self.layout.reports_dir())?;

        let params_file = self.layout.params_file(&run_id);
        self.fs
            .write(&params_file, params.to_file_contents().as_bytes())?;
        debug!(%run_id, params = params.len(), "parameters written");

        let initial = json!({ "status": RunStatus::Running });
        self.fs.write_atomic(
            &self.layout.status_file(&run_id),
            initial.to_string().as_bytes(),
        )?;

        let request = LaunchRequest {
            run_id,
            run_dir_arg: self.pipeline_path(&run_dir)?,
            params_file_arg: self.pipeline_path(&params_file)?,
            run_dir,
        };

        info!(
            %run_id,
            pipeline = %self.pipeline_name,
            params_file = %request.params_file_arg,
            "run accepted; queueing pipeline launch"
        );
        slot.dispatch(request);

        Ok(LaunchReceipt {
            run_id,
            message: format!("{} pipeline started", self.pipeline_name),
        })
    }

    /// Absolute host path rendered in the pipeline's convention.
    fn pipeline_path(&self, path: &Path) -> Result<String> {
        let absolute = std::path::absolute(path)?;
        Ok(translate_path(&absolute, self.path_style))
    }
}
