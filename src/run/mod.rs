// src/run/mod.rs

//! Run identity and on-disk representation.
//!
//! - [`layout`] maps a [`RunId`] to its directory, files and report URL.
//! - [`params`] validates submitted parameters and renders `params.txt`.
//! - [`status`] parses the pipeline-owned `status.json`.
//! - [`log_tail`] extracts the trailing excerpt of `execution.log`.

pub mod layout;
pub mod log_tail;
pub mod params;
pub mod status;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use layout::RunLayout;
pub use params::{ParamValue, RunParams};
pub use status::{RunStatus, parse_status_record, status_of};

/// Unique identifier of a run (a random UUID v4).
///
/// Run directories are keyed by the hyphenated lowercase form, so only
/// strings that parse as a UUID can ever name a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user-supplied identifier. Returns `None` for anything that is
    /// not a UUID, including path fragments like `../x`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_and_round_trip_through_display() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
        assert_eq!(RunId::parse(&a.to_string()), Some(a));
    }

    #[test]
    fn non_uuid_strings_are_not_run_ids() {
        assert_eq!(RunId::parse(""), None);
        assert_eq!(RunId::parse("../../etc"), None);
        assert_eq!(RunId::parse("run-1"), None);
    }
}
