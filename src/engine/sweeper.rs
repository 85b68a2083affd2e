// src/engine/sweeper.rs

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::run::{RunId, RunLayout, parse_status_record, status_of};

/// Outcome of one sweep over the work directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<RunId>,
    pub kept: usize,
}

/// TTL-based cleanup of finished runs.
///
/// A run is removed only when its status is terminal and `status.json` has
/// not been touched for at least `ttl`. Running runs, runs with unreadable
/// status files and directories that are not named like a run id are left
/// alone.
#[derive(Debug)]
pub struct Sweeper {
    layout: RunLayout,
    fs: Arc<dyn FileSystem>,
    ttl: Duration,
}

impl Sweeper {
    pub fn new(layout: RunLayout, fs: Arc<dyn FileSystem>, ttl: Duration) -> Self {
        Self { layout, fs, ttl }
    }

    pub fn sweep_once(&self, now: SystemTime) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let work_dir = self.layout.work_dir();
        if !self.fs.is_dir(work_dir) {
            return Ok(report);
        }

        for entry in self.fs.read_dir(work_dir)? {
            let Some(run_id) = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(RunId::parse)
            else {
                continue;
            };

            match self.is_expired(&run_id, now) {
                Ok(true) => {
                    self.remove_run(&run_id)?;
                    report.removed.push(run_id);
                }
                Ok(false) => report.kept += 1,
                Err(e) => {
                    debug!(%run_id, error = %e, "keeping run with unreadable status");
                    report.kept += 1;
                }
            }
        }

        Ok(report)
    }

    fn is_expired(&self, run_id: &RunId, now: SystemTime) -> Result<bool> {
        let status_file = self.layout.status_file(run_id);
        if !self.fs.is_file(&status_file) {
            return Ok(false);
        }

        let fields = parse_status_record(&self.fs.read_to_string(&status_file)?)?;
        let terminal = status_of(&fields).is_some_and(|s| s.is_terminal());
        if !terminal {
            return Ok(false);
        }

        let modified = self.fs.modified(&status_file)?;
        let age = now.duration_since(modified).unwrap_or_default();
        Ok(age >= self.ttl)
    }

    fn remove_run(&self, run_id: &RunId) -> Result<()> {
        self.fs.remove_dir_all(&self.layout.run_dir(run_id))?;

        let report = self.layout.report_file(run_id);
        if self.fs.is_file(&report) {
            self.fs.remove_file(&report)?;
        }

        info!(%run_id, "removed expired run");
        Ok(())
    }
}

/// Run `sweep_once` every `interval` until the returned task is aborted.
pub fn spawn_sweeper(sweeper: Sweeper, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            ttl = %humantime::format_duration(sweeper.ttl),
            interval = %humantime::format_duration(interval),
            "retention sweeper started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match sweeper.sweep_once(SystemTime::now()) {
                Ok(report) => debug!(
                    removed = report.removed.len(),
                    kept = report.kept,
                    "retention sweep finished"
                ),
                Err(e) => warn!(error = %e, "retention sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::Path;

    const OLD_DONE: &str = "11111111-1111-4111-8111-111111111111";
    const NEW_DONE: &str = "22222222-2222-4222-8222-222222222222";
    const OLD_RUNNING: &str = "33333333-3333-4333-8333-333333333333";
    const OLD_FAILED: &str = "44444444-4444-4444-8444-444444444444";

    fn seed(fs: &MockFileSystem, id: &str, status: &str, age: Duration, now: SystemTime) {
        let status_file = format!("/srv/work/{id}/status.json");
        fs.add_file(&status_file, format!(r#"{{"status":"{status}"}}"#));
        fs.set_modified(&status_file, now - age);
    }

    #[test]
    fn removes_only_expired_terminal_runs() {
        let fs = MockFileSystem::new();
        let now = SystemTime::now();
        let day = Duration::from_secs(24 * 60 * 60);

        seed(&fs, OLD_DONE, "complete", 3 * day, now);
        fs.add_file(format!("/srv/reports/{OLD_DONE}.html"), "<html/>");
        seed(&fs, NEW_DONE, "complete", Duration::from_secs(60), now);
        seed(&fs, OLD_RUNNING, "running", 3 * day, now);
        seed(&fs, OLD_FAILED, "failed", 3 * day, now);
        fs.add_file("/srv/work/not-a-run/notes.txt", "keep me");

        let layout = RunLayout::new("/srv/work", "/srv/reports", "/reports");
        let sweeper = Sweeper::new(layout, Arc::new(fs.clone()), day);

        let mut report = sweeper.sweep_once(now).unwrap();
        report.removed.sort_by_key(|id| id.to_string());

        assert_eq!(
            report.removed,
            vec![
                RunId::parse(OLD_DONE).unwrap(),
                RunId::parse(OLD_FAILED).unwrap()
            ]
        );
        assert_eq!(report.kept, 2);
        assert!(!fs.exists(Path::new(&format!("/srv/work/{OLD_DONE}"))));
        assert!(!fs.exists(Path::new(&format!("/srv/reports/{OLD_DONE}.html"))));
        assert!(fs.exists(Path::new(&format!("/srv/work/{OLD_RUNNING}/status.json"))));
        assert!(fs.exists(Path::new("/srv/work/not-a-run/notes.txt")));
    }

    #[test]
    fn malformed_status_is_kept() {
        let fs = MockFileSystem::new();
        let now = SystemTime::now();
        fs.add_file(format!("/srv/work/{OLD_DONE}/status.json"), "{\"status\":");

        let layout = RunLayout::new("/srv/work", "/srv/reports", "/reports");
        let sweeper = Sweeper::new(layout, Arc::new(fs.clone()), Duration::ZERO);

        let report = sweeper.sweep_once(now).unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(report.kept, 1);
    }

    #[test]
    fn missing_work_dir_is_an_empty_sweep() {
        let fs = MockFileSystem::new();
        let layout = RunLayout::new("/nowhere", "/srv/reports", "/reports");
        let sweeper = Sweeper::new(layout, Arc::new(fs), Duration::ZERO);
        assert_eq!(sweeper.sweep_once(SystemTime::now()).unwrap(), SweepReport::default());
    }
}
