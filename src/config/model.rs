// src/config/model.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::PathStyle;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// bind = "127.0.0.1:3000"
///
/// [storage]
/// work_dir = "work"
/// reports_dir = "public/reports"
///
/// [launcher]
/// name = "VisionX"
/// program = "wsl"
/// args = ["/home/me/run-visionx.sh", "{run_id}", "{params_file}"]
/// path_style = "wsl"
/// ```
///
/// Every section is optional, but `[launcher].program` must be set for the
/// file to pass validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub launcher: LauncherSection,

    #[serde(default)]
    pub status: StatusSection,

    #[serde(default)]
    pub retention: RetentionSection,

    #[serde(default)]
    pub client: ClientSection,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub launcher: LauncherSection,
    pub status: StatusSection,
    pub retention: RetentionSection,
    pub client: ClientSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            server: raw.server,
            storage: raw.storage,
            launcher: raw.launcher,
            status: raw.status,
            retention: raw.retention,
            client: raw.client,
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Address the HTTP API listens on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// `[storage]` section: where run directories and reports live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Parent of the per-run directories (`<work_dir>/<run_id>/`).
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Shared directory the pipeline writes `<run_id>.html` reports into.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// URL prefix under which `reports_dir` is served.
    #[serde(default = "default_reports_url_prefix")]
    pub reports_url_prefix: String,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("work")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("public/reports")
}

fn default_reports_url_prefix() -> String {
    "/reports".to_string()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            reports_dir: default_reports_dir(),
            reports_url_prefix: default_reports_url_prefix(),
        }
    }
}

/// `[launcher]` section: how the external pipeline is started.
#[derive(Debug, Clone, Deserialize)]
pub struct LauncherSection {
    /// Human-readable pipeline name used in launch confirmations.
    #[serde(default = "default_pipeline_name")]
    pub name: String,

    /// Executable to start for each run.
    #[serde(default)]
    pub program: String,

    /// Arguments; `{run_id}`, `{params_file}` and `{run_dir}` are substituted.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Path convention the executable expects.
    #[serde(default)]
    pub path_style: PathStyle,

    /// Maximum number of pipeline processes running at the same time.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum number of accepted launches waiting for a free process slot.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_pipeline_name() -> String {
    "Pipeline".to_string()
}

fn default_args() -> Vec<String> {
    vec!["{run_id}".to_string(), "{params_file}".to_string()]
}

fn default_max_concurrent() -> usize {
    4
}

fn default_queue_length() -> usize {
    32
}

impl Default for LauncherSection {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            program: String::new(),
            args: default_args(),
            path_style: PathStyle::default(),
            max_concurrent: default_max_concurrent(),
            queue_length: default_queue_length(),
        }
    }
}

/// `[status]` section: how snapshots are built and pushed.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSection {
    /// Number of trailing log lines included in a snapshot.
    #[serde(default = "default_log_excerpt_lines")]
    pub log_excerpt_lines: usize,

    /// How often the event stream re-reads a run's files.
    #[serde(default = "default_push_interval", with = "humantime_serde")]
    pub push_interval: Duration,
}

fn default_log_excerpt_lines() -> usize {
    10
}

fn default_push_interval() -> Duration {
    Duration::from_secs(1)
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            log_excerpt_lines: default_log_excerpt_lines(),
            push_interval: default_push_interval(),
        }
    }
}

/// `[retention]` section. Sweeping is disabled unless `ttl` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionSection {
    /// Finished runs older than this are removed.
    #[serde(default, with = "humantime_serde")]
    pub ttl: Option<Duration>,

    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

impl Default for RetentionSection {
    fn default() -> Self {
        Self {
            ttl: None,
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// `[client]` section used by `submit`, `status` and `watch`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval: default_poll_interval(),
        }
    }
}
