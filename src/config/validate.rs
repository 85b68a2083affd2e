// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RuntrackError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RuntrackError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_launcher(cfg)?;
    validate_storage(cfg)?;
    validate_intervals(cfg)?;
    Ok(())
}

fn validate_launcher(cfg: &RawConfigFile) -> Result<()> {
    let launcher = &cfg.launcher;

    if launcher.program.trim().is_empty() {
        return Err(RuntrackError::ConfigError(
            "[launcher].program must name the pipeline executable".to_string(),
        ));
    }

    // path_style is strongly typed and validated during deserialization.

    if launcher.max_concurrent == 0 {
        return Err(RuntrackError::ConfigError(
            "[launcher].max_concurrent must be >= 1 (got 0)".to_string(),
        ));
    }

    if launcher.queue_length == 0 {
        return Err(RuntrackError::ConfigError(
            "[launcher].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(cfg: &RawConfigFile) -> Result<()> {
    let storage = &cfg.storage;

    if storage.work_dir.as_os_str().is_empty() {
        return Err(RuntrackError::ConfigError(
            "[storage].work_dir must not be empty".to_string(),
        ));
    }

    if storage.reports_dir.as_os_str().is_empty() {
        return Err(RuntrackError::ConfigError(
            "[storage].reports_dir must not be empty".to_string(),
        ));
    }

    let prefix = storage.reports_url_prefix.trim_end_matches('/');
    if !storage.reports_url_prefix.starts_with('/') || prefix.is_empty() {
        return Err(RuntrackError::ConfigError(format!(
            "[storage].reports_url_prefix must be an absolute URL path like \"/reports\" (got {:?})",
            storage.reports_url_prefix
        )));
    }

    if cfg.status.log_excerpt_lines == 0 {
        return Err(RuntrackError::ConfigError(
            "[status].log_excerpt_lines must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_intervals(cfg: &RawConfigFile) -> Result<()> {
    let checks = [
        ("[status].push_interval", cfg.status.push_interval),
        ("[retention].sweep_interval", cfg.retention.sweep_interval),
        ("[client].poll_interval", cfg.client.poll_interval),
    ];

    for (name, value) in checks {
        if value.is_zero() {
            return Err(RuntrackError::ConfigError(format!(
                "{name} must be greater than zero"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_program() -> RawConfigFile {
        let mut raw = RawConfigFile::default();
        raw.launcher.program = "run-pipeline.sh".to_string();
        raw
    }

    #[test]
    fn defaults_with_program_are_valid() {
        let cfg = ConfigFile::try_from(raw_with_program()).unwrap();
        assert_eq!(cfg.status.log_excerpt_lines, 10);
        assert_eq!(cfg.client.poll_interval.as_secs(), 5);
        assert!(cfg.retention.ttl.is_none());
    }

    #[test]
    fn missing_program_is_rejected() {
        let err = ConfigFile::try_from(RawConfigFile::default()).unwrap_err();
        assert!(matches!(err, RuntrackError::ConfigError(msg) if msg.contains("program")));
    }

    #[test]
    fn root_reports_prefix_is_rejected() {
        let mut raw = raw_with_program();
        raw.storage.reports_url_prefix = "/".to_string();
        assert!(ConfigFile::try_from(raw).is_err());

        let mut raw = raw_with_program();
        raw.storage.reports_url_prefix = "reports".to_string();
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut raw = raw_with_program();
        raw.launcher.max_concurrent = 0;
        assert!(ConfigFile::try_from(raw).is_err());

        let mut raw = raw_with_program();
        raw.launcher.queue_length = 0;
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut raw = raw_with_program();
        raw.client.poll_interval = std::time::Duration::ZERO;
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }
}
