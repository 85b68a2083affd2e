// src/exec/path.rs

//! Host path to pipeline path translation.

use std::path::Path;

use crate::types::PathStyle;

/// Render `path` the way the pipeline executable expects to receive it.
pub fn translate_path(path: &Path, style: PathStyle) -> String {
    let raw = path.to_string_lossy();
    match style {
        PathStyle::Native => raw.into_owned(),
        PathStyle::Wsl => to_wsl_path(&raw),
    }
}

/// `C:\work\run\params.txt` -> `/mnt/c/work/run/params.txt`.
///
/// Only the drive letter is lowercased; the rest of the path keeps its case
/// because Linux-side paths are case-sensitive. Paths without a drive prefix
/// just get their separators normalised.
pub fn to_wsl_path(raw: &str) -> String {
    let normalised = raw.replace('\\', "/");
    let mut chars = normalised.chars();

    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("/mnt/{}{}", drive.to_ascii_lowercase(), &normalised[2..])
        }
        _ => normalised,
    }
}
