// src/exec/launch_runner.rs

//! Individual pipeline process runner.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::LauncherSection;
use crate::fs::FileSystem;
use crate::run::layout::LAUNCH_ERROR_FILE;

use super::backend::LaunchRequest;

/// Lines of stdout/stderr kept for `launch_error.log`.
const CAPTURED_LINES: usize = 200;

/// Why a pipeline process did not run to a successful exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFailure {
    pub message: String,
    pub stdout: String,
    pub stderr: String,
}

impl LaunchFailure {
    /// Contents of `launch_error.log`.
    pub fn render(&self) -> String {
        format!(
            "Error: {}\nStdout: {}\nStderr: {}",
            self.message, self.stdout, self.stderr
        )
    }
}

/// Run a single pipeline process to completion.
///
/// Failures are never returned to the HTTP caller (who got the run id long
/// ago); they are persisted as `launch_error.log` inside the run directory.
pub async fn run_launch(
    request: LaunchRequest,
    launcher: Arc<LauncherSection>,
    fs: Arc<dyn FileSystem>,
) {
    let run_id = request.run_id;
    let Err(failure) = run_launch_inner(&request, &launcher).await else {
        return;
    };

    error!(
        %run_id,
        error = %failure.message,
        "pipeline launch failed"
    );

    let error_log = request.run_dir.join(LAUNCH_ERROR_FILE);
    if let Err(e) = fs.write(&error_log, failure.render().as_bytes()) {
        warn!(
            %run_id,
            path = %error_log.display(),
            error = %e,
            "failed to persist launch error log"
        );
    }
}

/// Expand `{run_id}`, `{params_file}` and `{run_dir}` in one argument template.
pub fn expand_arg(template: &str, request: &LaunchRequest) -> String {
    template
        .replace("{run_id}", &request.run_id.to_string())
        .replace("{params_file}", &request.params_file_arg)
        .replace("{run_dir}", &request.run_dir_arg)
}

async fn run_launch_inner(
    request: &LaunchRequest,
    launcher: &LauncherSection,
) -> Result<(), LaunchFailure> {
    let args: Vec<String> = launcher
        .args
        .iter()
        .map(|a| expand_arg(a, request))
        .collect();

    info!(
        run_id = %request.run_id,
        program = %launcher.program,
        ?args,
        "starting pipeline process"
    );

    let mut cmd = Command::new(&launcher.program);
    cmd.args(&args)
        .env("RUNTRACK_RUN_ID", request.run_id.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning pipeline program '{}'", launcher.program))
        .map_err(|e| LaunchFailure {
            message: format!("{e:#}"),
            stdout: String::new(),
            stderr: String::new(),
        })?;

    // Always consume both pipes so a chatty pipeline never blocks on a full buffer.
    let stdout = child
        .stdout
        .take()
        .map(|s| capture_lines(s, request, "stdout"));
    let stderr = child
        .stderr
        .take()
        .map(|s| capture_lines(s, request, "stderr"));

    let status = child.wait().await;

    let stdout = collect(stdout).await;
    let stderr = collect(stderr).await;

    let status = status
        .with_context(|| format!("waiting for pipeline process of run {}", request.run_id))
        .map_err(|e| LaunchFailure {
            message: format!("{e:#}"),
            stdout: stdout.clone(),
            stderr: stderr.clone(),
        })?;

    info!(
        run_id = %request.run_id,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "pipeline process exited"
    );

    if status.success() {
        return Ok(());
    }

    Err(LaunchFailure {
        message: format!("pipeline process exited with {status}"),
        stdout,
        stderr,
    })
}

/// Log each line at debug and keep the last `CAPTURED_LINES` of them.
fn capture_lines<R>(reader: R, request: &LaunchRequest, stream: &'static str) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let run_id = request.run_id;
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut kept: VecDeque<String> = VecDeque::with_capacity(CAPTURED_LINES);

        while let Ok(Some(line)) = lines.next_line().await {
            debug!(%run_id, stream, "{}", line);
            if kept.len() == CAPTURED_LINES {
                kept.pop_front();
            }
            kept.push_back(line);
        }

        kept.into_iter().collect::<Vec<_>>().join("\n")
    })
}

async fn collect(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunId;
    use std::path::PathBuf;

    fn request() -> LaunchRequest {
        LaunchRequest {
            run_id: RunId::parse("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap(),
            run_dir: PathBuf::from("/srv/work/0f8fad5b-d9cb-469f-a165-70867728950e"),
            run_dir_arg: "/mnt/c/work/0f8fad5b-d9cb-469f-a165-70867728950e".to_string(),
            params_file_arg: "/mnt/c/work/0f8fad5b-d9cb-469f-a165-70867728950e/params.txt"
                .to_string(),
        }
    }

    #[test]
    fn placeholders_expand_inside_larger_arguments() {
        let req = request();
        assert_eq!(
            expand_arg("--run={run_id}", &req),
            "--run=0f8fad5b-d9cb-469f-a165-70867728950e"
        );
        assert_eq!(
            expand_arg("{params_file}", &req),
            "/mnt/c/work/0f8fad5b-d9cb-469f-a165-70867728950e/params.txt"
        );
        assert_eq!(
            expand_arg("{run_dir}/out", &req),
            "/mnt/c/work/0f8fad5b-d9cb-469f-a165-70867728950e/out"
        );
        assert_eq!(expand_arg("--verbose", &req), "--verbose");
    }

    #[test]
    fn failure_log_format() {
        let failure = LaunchFailure {
            message: "pipeline process exited with exit status: 3".to_string(),
            stdout: "starting".to_string(),
            stderr: "boom".to_string(),
        };
        assert_eq!(
            failure.render(),
            "Error: pipeline process exited with exit status: 3\nStdout: starting\nStderr: boom"
        );
    }
}
