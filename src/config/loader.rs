// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ClientSection, ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the entry point for `serve`, `check` and `sweep`:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks launcher, storage and interval sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Client settings for `submit`, `status` and `watch`.
///
/// Client commands only need `[client]`, so a missing config file falls back
/// to defaults and the server-side sections are not validated.
pub fn load_client_settings(path: impl AsRef<Path>) -> Result<ClientSection> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ClientSection::default());
    }
    Ok(load_from_path(path)?.client)
}

