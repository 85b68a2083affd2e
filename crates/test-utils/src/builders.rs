#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use runtrack::config::{ConfigFile, RawConfigFile};
use runtrack::types::PathStyle;

/// Builder for `ConfigFile` to simplify test setup.
///
/// `in_dir(root)` points the work and reports directories below `root`
/// (usually a `tempfile::TempDir`) and uses `true` as the pipeline program.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn in_dir(root: &Path) -> Self {
        let mut config = RawConfigFile::default();
        config.storage.work_dir = root.join("work");
        config.storage.reports_dir = root.join("public").join("reports");
        config.launcher.program = "true".to_string();
        config.launcher.name = "Test".to_string();
        Self { config }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.launcher.program = program.to_string();
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.config.launcher.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn pipeline_name(mut self, name: &str) -> Self {
        self.config.launcher.name = name.to_string();
        self
    }

    pub fn path_style(mut self, style: PathStyle) -> Self {
        self.config.launcher.path_style = style;
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.launcher.max_concurrent = n;
        self
    }

    pub fn queue_length(mut self, n: usize) -> Self {
        self.config.launcher.queue_length = n;
        self
    }

    pub fn log_excerpt_lines(mut self, n: usize) -> Self {
        self.config.status.log_excerpt_lines = n;
        self
    }

    pub fn push_interval(mut self, interval: Duration) -> Self {
        self.config.status.push_interval = interval;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.retention.ttl = Some(ttl);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
