// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `foreman daemon` - start/stop/status for the `foremand` background
//! process. Grounded in the teacher's `commands/daemon.rs`, narrowed to the
//! three lifecycle operations a per-repository daemon needs (no
//! orphan/log/restart surface — this daemon keeps no WAL to reconcile).

use std::path::Path;
use std::time::{Duration, Instant};

use clap::{Args, Subcommand};

use foreman_core::config::Config;

use crate::client::{ClientError, DaemonClient};
use crate::daemon_process;

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `foremand` in the background (or `--foreground` for debugging).
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the running daemon.
    Stop,
    /// Report whether the daemon is running.
    Status,
}

pub async fn run(args: DaemonArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(config_path, foreground).await,
        DaemonCommand::Stop => stop(config_path).await,
        DaemonCommand::Status => status(config_path).await,
    }
}

async fn start(config_path: &Path, foreground: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let socket_path = config.daemon_socket_path();
    if socket_path.exists() && DaemonClient::connect(&socket_path).await.is_ok() {
        println!("foremand is already running");
        return Ok(());
    }

    if foreground {
        let foremand = daemon_process::find_foremand_binary();
        let status = std::process::Command::new(foremand).arg(config_path).status()?;
        if !status.success() {
            anyhow::bail!("foremand exited with {status}");
        }
        return Ok(());
    }

    let child = daemon_process::start_daemon_background(config_path)?;
    wait_for_ready(&socket_path, Duration::from_secs(10)).await?;
    println!("foremand started (pid {})", child.id());
    Ok(())
}

async fn stop(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    daemon_process::stop_daemon_sync(&config.daemon_lock_path());
    println!("foremand stopped");
    Ok(())
}

async fn status(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    match DaemonClient::connect(&config.daemon_socket_path()).await {
        Ok(client) => {
            let response = client.send(foreman_core::Command::Status).await?;
            crate::commands::print_response(&response);
        }
        Err(ClientError::DaemonNotRunning(_)) => println!("foremand is not running"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn wait_for_ready(socket_path: &Path, timeout: Duration) -> anyhow::Result<()> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if DaemonClient::connect(socket_path).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    anyhow::bail!("timed out waiting for foremand to become ready")
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
