// src/run/layout.rs

use std::path::{Path, PathBuf};

use crate::config::ConfigFile;

use super::RunId;

pub const PARAMS_FILE: &str = "params.txt";
pub const STATUS_FILE: &str = "status.json";
pub const LOG_FILE: &str = "execution.log";
pub const LAUNCH_ERROR_FILE: &str = "launch_error.log";
pub const REPORT_EXTENSION: &str = "html";

/// Where everything belonging to a run lives.
///
/// ```text
/// <work_dir>/<run_id>/params.txt        written by the launcher
/// <work_dir>/<run_id>/status.json       initial record by the launcher, then the pipeline
/// <work_dir>/<run_id>/execution.log     pipeline
/// <work_dir>/<run_id>/launch_error.log  launcher, only when the process fails to start or exits non-zero
/// <reports_dir>/<run_id>.html           pipeline, on success
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    work_dir: PathBuf,
    reports_dir: PathBuf,
    reports_url_prefix: String,
}

impl RunLayout {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        reports_dir: impl Into<PathBuf>,
        reports_url_prefix: impl Into<String>,
    ) -> Self {
        let prefix: String = reports_url_prefix.into();
        Self {
            work_dir: work_dir.into(),
            reports_dir: reports_dir.into(),
            reports_url_prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            cfg.storage.work_dir.clone(),
            cfg.storage.reports_dir.clone(),
            cfg.storage.reports_url_prefix.clone(),
        )
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.work_dir.join(run_id.to_string())
    }

    pub fn params_file(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(PARAMS_FILE)
    }

    pub fn status_file(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(STATUS_FILE)
    }

    pub fn log_file(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(LOG_FILE)
    }

    pub fn launch_error_file(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join(LAUNCH_ERROR_FILE)
    }

    pub fn report_file(&self, run_id: &RunId) -> PathBuf {
        self.reports_dir
            .join(format!("{run_id}.{REPORT_EXTENSION}"))
    }

    /// Public URL of the report artifact, e.g. `/reports/<run_id>.html`.
    pub fn report_url(&self, run_id: &RunId) -> String {
        format!("{}/{run_id}.{REPORT_EXTENSION}", self.reports_url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_keyed_by_run_id() {
        let layout = RunLayout::new("/srv/work", "/srv/public/reports", "/reports/");
        let id = RunId::parse("8c1f7a52-5d8e-4c63-9a57-2b1c7f0e9d41").unwrap();

        assert_eq!(
            layout.status_file(&id),
            PathBuf::from("/srv/work/8c1f7a52-5d8e-4c63-9a57-2b1c7f0e9d41/status.json")
        );
        assert_eq!(
            layout.report_file(&id),
            PathBuf::from("/srv/public/reports/8c1f7a52-5d8e-4c63-9a57-2b1c7f0e9d41.html")
        );
        assert_eq!(
            layout.report_url(&id),
            "/reports/8c1f7a52-5d8e-4c63-9a57-2b1c7f0e9d41.html"
        );
    }
}
