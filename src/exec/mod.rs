// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually starting the external pipeline,
//! using `tokio::process::Command`, fully detached from the HTTP request that
//! asked for it.
//!
//! - [`backend`] provides the `LaunchBackend` trait and the concrete
//!   `RealLaunchBackend` used in production, which tests replace with a fake.
//! - [`executor_loop`] owns the bounded queue and the concurrency limit.
//! - [`launch_runner`] runs one process and records failures on disk.
//! - [`path`] translates host paths into the pipeline's path convention.

pub mod backend;
pub mod executor_loop;
pub mod launch_runner;
pub mod path;

pub use backend::{LaunchBackend, LaunchRequest, LaunchSlot, RealLaunchBackend};
pub use path::translate_path;
