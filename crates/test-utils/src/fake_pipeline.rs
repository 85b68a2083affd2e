use std::fs;
use std::io::Write;

use serde_json::json;

use runtrack::run::{RunId, RunLayout};

/// Plays the external pipeline: mutates a run's files the way the real
/// process would, directly on disk.
pub struct FakePipeline {
    layout: RunLayout,
}

impl FakePipeline {
    pub fn new(layout: RunLayout) -> Self {
        Self { layout }
    }

    pub fn set_status(&self, run_id: &RunId, status: &str) {
        self.write_raw_status(run_id, &json!({ "status": status }).to_string());
    }

    /// Replaces `status.json` via rename so concurrent readers never see a
    /// truncated file.
    pub fn write_raw_status(&self, run_id: &RunId, raw: &str) {
        let target = self.layout.status_file(run_id);
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, raw).expect("writing staged status.json");
        fs::rename(&staging, &target).expect("replacing status.json");
    }

    pub fn append_log(&self, run_id: &RunId, lines: &[&str]) {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.layout.log_file(run_id))
            .expect("opening execution.log");
        for line in lines {
            writeln!(file, "{line}").expect("appending to execution.log");
        }
    }

    pub fn write_report(&self, run_id: &RunId) {
        fs::create_dir_all(self.layout.reports_dir()).expect("creating reports dir");
        fs::write(
            self.layout.report_file(run_id),
            format!("<html><body>report for {run_id}</body></html>"),
        )
        .expect("writing report");
    }

    /// Finish the run successfully: log lines, report, then `complete`.
    pub fn complete(&self, run_id: &RunId, log_lines: &[&str]) {
        self.append_log(run_id, log_lines);
        self.write_report(run_id);
        self.set_status(run_id, "complete");
    }
}
