// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntrackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Run ID is required")]
    MissingRunId,

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid status record: {0}")]
    StatusParse(String),

    #[error("Launch queue is full ({0} launches pending)")]
    QueueFull(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RuntrackError>;
