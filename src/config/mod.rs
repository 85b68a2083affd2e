// src/config/mod.rs

//! Configuration loading and validation for runtrack.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate launcher/storage/interval invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_client_settings, load_from_path};
pub use model::{
    ClientSection, ConfigFile, LauncherSection, RawConfigFile, RetentionSection, ServerSection,
    StatusSection, StorageSection,
};
