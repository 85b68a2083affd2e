// src/run/params.rs

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

use crate::errors::{Result, RuntrackError};

/// A scalar parameter value as submitted in the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("null"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::String(s) => f.write_str(s),
        }
    }
}

/// Validated parameter set for one run.
///
/// Entries are kept in key order, which is also the order of `params.txt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunParams {
    entries: BTreeMap<String, ParamValue>,
}

impl RunParams {
    /// Validate a JSON object of parameters.
    ///
    /// Keys must be non-empty and free of `=` and line breaks; values must be
    /// scalars without line breaks, so each entry stays one `key=value` line.
    pub fn from_json(map: &Map<String, Value>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            validate_key(key)?;
            let value = match value {
                Value::Null => ParamValue::Null,
                Value::Bool(b) => ParamValue::Bool(*b),
                Value::Number(n) => ParamValue::Number(n.clone()),
                Value::String(s) => {
                    if s.contains(['\n', '\r']) {
                        return Err(RuntrackError::InvalidParams(format!(
                            "value of parameter '{key}' must not contain line breaks"
                        )));
                    }
                    ParamValue::String(s.clone())
                }
                Value::Array(_) | Value::Object(_) => {
                    return Err(RuntrackError::InvalidParams(format!(
                        "parameter '{key}' must be a string, number, boolean or null"
                    )));
                }
            };
            entries.insert(key.clone(), value);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as `key=value` lines, each terminated by `\n`.
    pub fn to_file_contents(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(RuntrackError::InvalidParams(
            "parameter names must not be empty".to_string(),
        ));
    }
    if key.contains(['=', '\n', '\r']) {
        return Err(RuntrackError::InvalidParams(format!(
            "parameter name {key:?} must not contain '=' or line breaks"
        )));
    }
    Ok(())
}

/// Parse a CLI `KEY=VALUE` assignment into a JSON entry.
///
/// Values that read as JSON numbers or booleans are sent typed; everything
/// else is sent as a string (`device=cpu` stays `"cpu"`).
pub fn parse_assignment(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in {s:?}"));
    }

    let value = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    };
    Ok((key.to_string(), value))
}
