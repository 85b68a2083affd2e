// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod run;
pub mod server;
pub mod types;

use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Result, bail};
use serde_json::Map;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::client::{RunClient, StatusReply};
use crate::config::{ConfigFile, load_and_validate, load_client_settings};
use crate::engine::Sweeper;
use crate::fs::RealFileSystem;
use crate::run::RunLayout;

/// High-level entry point used by `main.rs`.
///
/// Dispatches the subcommand:
/// - `serve` / `check` / `sweep` need a fully validated config
/// - `submit` / `status` / `watch` only need the `[client]` section
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Serve { bind } => {
            let cfg = load_and_validate(&args.config)?;
            server::serve(cfg, bind).await
        }
        Command::Check => {
            let cfg = load_and_validate(&args.config)?;
            print_config(&cfg);
            Ok(())
        }
        Command::Sweep => {
            let cfg = load_and_validate(&args.config)?;
            sweep_now(&cfg)
        }
        Command::Submit {
            params,
            wait,
            server,
        } => {
            let settings = load_client_settings(&args.config)?;
            let client = RunClient::new(server.unwrap_or(settings.base_url))?;

            let params: Map<_, _> = params.into_iter().collect();
            let receipt = client.submit(&params).await?;
            println!("{}", receipt.message);
            println!("run id: {}", receipt.run_id);

            if wait {
                let reply = client
                    .wait_for_terminal(
                        &receipt.run_id.to_string(),
                        settings.poll_interval,
                        progress_printer(),
                    )
                    .await?;
                print_final(&reply);
            }
            Ok(())
        }
        Command::Status { run_id, server } => {
            let settings = load_client_settings(&args.config)?;
            let client = RunClient::new(server.unwrap_or(settings.base_url))?;
            let reply = client.status(&run_id).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(())
        }
        Command::Watch { run_id, server } => {
            let settings = load_client_settings(&args.config)?;
            let client = RunClient::new(server.unwrap_or(settings.base_url))?;
            let reply = client
                .wait_for_terminal(&run_id, settings.poll_interval, progress_printer())
                .await?;
            print_final(&reply);
            Ok(())
        }
    }
}

/// Prints the status whenever it changes and any new log excerpt.
fn progress_printer() -> impl FnMut(&StatusReply) {
    let mut last_status = None;
    let mut last_excerpt = None;
    move |reply: &StatusReply| {
        if reply.status != last_status {
            let shown = reply.status.as_ref().map(|s| s.as_str()).unwrap_or("unknown");
            println!("status: {shown}");
            last_status = reply.status.clone();
        }
        if reply.log_excerpt.is_some() && reply.log_excerpt != last_excerpt {
            if let Some(ref excerpt) = reply.log_excerpt {
                println!("--- log ---\n{}", excerpt.trim_end());
            }
            last_excerpt = reply.log_excerpt.clone();
        }
    }
}

fn print_final(reply: &StatusReply) {
    match &reply.report_url {
        Some(url) => println!("report: {url}"),
        None => println!("no report produced"),
    }
}

fn sweep_now(cfg: &ConfigFile) -> Result<()> {
    let Some(ttl) = cfg.retention.ttl else {
        bail!("[retention].ttl is not configured; nothing to sweep");
    };

    let sweeper = Sweeper::new(RunLayout::from_config(cfg), Arc::new(RealFileSystem), ttl);
    let report = sweeper.sweep_once(SystemTime::now())?;
    info!(removed = report.removed.len(), kept = report.kept, "sweep complete");

    for run_id in &report.removed {
        println!("removed {run_id}");
    }
    println!("{} removed, {} kept", report.removed.len(), report.kept);
    Ok(())
}

/// `check` output: the effective settings after defaults.
fn print_config(cfg: &ConfigFile) {
    println!("runtrack config");
    println!("  server.bind = {}", cfg.server.bind);
    println!("  storage.work_dir = {}", cfg.storage.work_dir.display());
    println!("  storage.reports_dir = {}", cfg.storage.reports_dir.display());
    println!("  storage.reports_url_prefix = {}", cfg.storage.reports_url_prefix);
    println!();

    println!("launcher ({}):", cfg.launcher.name);
    println!("  program: {}", cfg.launcher.program);
    println!("  args: {:?}", cfg.launcher.args);
    println!("  path_style: {:?}", cfg.launcher.path_style);
    println!("  max_concurrent: {}", cfg.launcher.max_concurrent);
    println!("  queue_length: {}", cfg.launcher.queue_length);
    println!();

    println!("status:");
    println!("  log_excerpt_lines: {}", cfg.status.log_excerpt_lines);
    println!(
        "  push_interval: {}",
        humantime::format_duration(cfg.status.push_interval)
    );

    println!("retention:");
    match cfg.retention.ttl {
        Some(ttl) => {
            println!("  ttl: {}", humantime::format_duration(ttl));
            println!(
                "  sweep_interval: {}",
                humantime::format_duration(cfg.retention.sweep_interval)
            );
        }
        None => println!("  disabled (no ttl)"),
    }

    println!("client:");
    println!("  base_url: {}", cfg.client.base_url);
    println!(
        "  poll_interval: {}",
        humantime::format_duration(cfg.client.poll_interval)
    );
}
