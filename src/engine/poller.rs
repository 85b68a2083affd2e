// src/engine/poller.rs

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Result, RuntrackError};
use crate::fs::FileSystem;
use crate::run::log_tail::tail_lines;
use crate::run::{RunId, RunLayout, RunStatus, parse_status_record, status_of};

/// Point-in-time view of a run.
///
/// Serializes as the pipeline's status record merged with `runId`,
/// `reportUrl` and `logExcerpt`; the computed fields win over same-named
/// fields in the record.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub fields: Map<String, Value>,
    pub report_url: Option<String>,
    pub log_excerpt: Option<String>,
}

const COMPUTED_FIELDS: [&str; 3] = ["runId", "reportUrl", "logExcerpt"];

impl RunSnapshot {
    pub fn status(&self) -> Option<RunStatus> {
        status_of(&self.fields)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_some_and(|s| s.is_terminal())
    }
}

impl Serialize for RunSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            if !COMPUTED_FIELDS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("runId", &self.run_id)?;
        map.serialize_entry("reportUrl", &self.report_url)?;
        map.serialize_entry("logExcerpt", &self.log_excerpt)?;
        map.end()
    }
}

/// Reads run state from disk. Every call goes back to the files; nothing is
/// cached because the pipeline changes them behind our back.
#[derive(Debug)]
pub struct Poller {
    layout: RunLayout,
    fs: Arc<dyn FileSystem>,
    log_excerpt_lines: usize,
}

impl Poller {
    pub fn new(layout: RunLayout, fs: Arc<dyn FileSystem>, log_excerpt_lines: usize) -> Self {
        Self {
            layout,
            fs,
            log_excerpt_lines,
        }
    }

    /// Snapshot for a raw, user-supplied run id.
    ///
    /// - missing/blank id: `MissingRunId`
    /// - id that is not a run id or has no status file: `RunNotFound`
    /// - unreadable or malformed status file: `StatusParse` / `Other`
    pub fn snapshot(&self, run_id: Option<&str>) -> Result<RunSnapshot> {
        let raw = run_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RuntrackError::MissingRunId)?;

        let run_id =
            RunId::parse(raw).ok_or_else(|| RuntrackError::RunNotFound(raw.to_string()))?;

        self.snapshot_of(&run_id)
    }

    pub fn snapshot_of(&self, run_id: &RunId) -> Result<RunSnapshot> {
        let status_file = self.layout.status_file(run_id);
        if !self.fs.is_file(&status_file) {
            return Err(RuntrackError::RunNotFound(run_id.to_string()));
        }

        let raw = self.fs.read_to_string(&status_file)?;
        let fields = parse_status_record(&raw)?;

        let report_url = self
            .fs
            .is_file(&self.layout.report_file(run_id))
            .then(|| self.layout.report_url(run_id));

        let log_file = self.layout.log_file(run_id);
        let log_excerpt = if self.fs.is_file(&log_file) {
            let bytes = self.fs.read(&log_file)?;
            Some(tail_lines(
                &String::from_utf8_lossy(&bytes),
                self.log_excerpt_lines,
            ))
        } else {
            None
        };

        debug!(
            %run_id,
            status = ?status_of(&fields),
            has_report = report_url.is_some(),
            has_log = log_excerpt.is_some(),
            "run snapshot"
        );

        Ok(RunSnapshot {
            run_id: *run_id,
            fields,
            report_url,
            log_excerpt,
        })
    }
}
