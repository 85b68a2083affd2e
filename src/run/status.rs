// src/run/status.rs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Result, RuntrackError};

/// Progress of a run as reported in `status.json`.
///
/// The record is owned by the pipeline, so values other than the three
/// well-known ones are carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Complete,
    Failed,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Complete => "complete",
            RunStatus::Failed => "failed",
            RunStatus::Other(s) => s,
        }
    }

    /// `complete` and `failed` end a run; pollers stop on them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::Failed)
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        match s {
            "running" => RunStatus::Running,
            "complete" => RunStatus::Complete,
            "failed" => RunStatus::Failed,
            other => RunStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RunStatus::from(s.as_str()))
    }
}

/// Parse the contents of `status.json`.
///
/// The record's shape belongs to the pipeline, so only JSON syntax is
/// checked. A valid record that is not an object contributes no fields. A
/// half-written file from a pipeline that does not replace it atomically
/// shows up here as a parse error.
pub fn parse_status_record(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => {
            debug!(kind = json_kind(&other), "status record is not an object; no fields");
            Ok(Map::new())
        }
        Err(e) => Err(RuntrackError::StatusParse(e.to_string())),
    }
}

/// Status value of a parsed record, if it has a string `status` field.
pub fn status_of(fields: &Map<String, Value>) -> Option<RunStatus> {
    fields
        .get("status")
        .and_then(Value::as_str)
        .map(RunStatus::from)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_and_failed_are_terminal() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Complete.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::from("queued").is_terminal());
    }

    #[test]
    fn status_record_keeps_pipeline_fields() {
        let fields =
            parse_status_record(r#"{"status":"running","progress":40,"stage":"train"}"#).unwrap();
        assert_eq!(status_of(&fields), Some(RunStatus::Running));
        assert_eq!(fields["progress"], 40);
    }

    #[test]
    fn truncated_records_fail_to_parse() {
        assert!(matches!(
            parse_status_record(r#"{"status":"runn"#),
            Err(RuntrackError::StatusParse(_))
        ));
        assert!(matches!(
            parse_status_record(""),
            Err(RuntrackError::StatusParse(_))
        ));
    }

    #[test]
    fn non_object_records_have_no_fields() {
        for raw in ["null", "[]", "[1, 2]", r#""complete""#, "7"] {
            let fields = parse_status_record(raw).unwrap();
            assert!(fields.is_empty(), "{raw}");
            assert_eq!(status_of(&fields), None);
        }
    }
}
