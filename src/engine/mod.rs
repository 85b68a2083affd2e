// src/engine/mod.rs

//! Run tracking engine.
//!
//! - [`launcher`] turns a parameter set into a run directory plus a queued
//!   pipeline launch, and returns the run id straight away.
//! - [`poller`] builds point-in-time snapshots of a run from its files.
//! - [`sweeper`] removes finished runs once they outlive the retention TTL.
//!
//! None of these keep in-process state about runs: the run directories are
//! the single source of truth, and the pipeline mutates them out-of-band.

pub mod launcher;
pub mod poller;
pub mod sweeper;

pub use launcher::{LaunchReceipt, Launcher};
pub use poller::{Poller, RunSnapshot};
pub use sweeper::{SweepReport, Sweeper, spawn_sweeper};
