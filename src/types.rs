use serde::Deserialize;

/// How host paths are handed to the pipeline executable.
///
/// - `Native`: pass the path unchanged.
/// - `Wsl`: the executable runs inside WSL, so `C:\work\x` becomes
///   `/mnt/c/work/x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Native,
    Wsl,
}

impl Default for PathStyle {
    fn default() -> Self {
        PathStyle::Native
    }
}
