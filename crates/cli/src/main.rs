// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! foreman - CLI client for the orchestration daemon (`foremand`).
//!
//! Grounded in the teacher's `oj` CLI (`clap::Parser` derive, a thin
//! per-subcommand handler module, a `DaemonClient` connecting over a Unix
//! socket), narrowed to the command surface of §4.10/§4.14: dispatching
//! and cancelling agents, status, and starting/stopping the daemon itself.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod daemon_process;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use foreman_core::config::Config;
use foreman_core::WorkItemId;

use client::{ClientError, DaemonClient};

#[derive(Parser)]
#[command(name = "foreman", version, about = "Orchestration control plane for AI planner/implementor/reviewer agents")]
struct Cli {
    /// Path to the declarative config document (§6).
    #[arg(short = 'c', long = "config", global = true, default_value = "foreman.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch an implementor for a work item (§4.10).
    DispatchImplementor { work_item_id: u64 },
    /// Dispatch a reviewer for a work item already in `review` (§4.10).
    DispatchReviewer { work_item_id: u64 },
    /// Cancel the running agent session for a work item, if any (§4.10).
    CancelAgent { work_item_id: u64 },
    /// Cancel the running planner session, if any (§4.10).
    CancelPlanner,
    /// Request a graceful shutdown of the daemon (§4.12 "Shutdown").
    Shutdown,
    /// Print the current work-item count, planner status, and running
    /// agent sessions (§1.2 supplement).
    Status,
    /// Manage the `foremand` background process.
    Daemon(commands::daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { config: config_path, command } = cli;

    if let Commands::Daemon(args) = command {
        return commands::daemon::run(args, &config_path).await;
    }

    let config = Config::load(&config_path)?;
    let socket_path = config.daemon_socket_path();

    let command = match command {
        Commands::DispatchImplementor { work_item_id } => {
            foreman_core::Command::DispatchImplementor { work_item_id: WorkItemId::new(work_item_id) }
        }
        Commands::DispatchReviewer { work_item_id } => {
            foreman_core::Command::DispatchReviewer { work_item_id: WorkItemId::new(work_item_id) }
        }
        Commands::CancelAgent { work_item_id } => {
            foreman_core::Command::CancelAgent { work_item_id: WorkItemId::new(work_item_id) }
        }
        Commands::CancelPlanner => foreman_core::Command::CancelPlanner,
        Commands::Shutdown => foreman_core::Command::Shutdown,
        Commands::Status => foreman_core::Command::Status,
        Commands::Daemon(_) => unreachable!("handled above"),
    };

    let client = DaemonClient::connect(&socket_path).await.map_err(|e| {
        if matches!(e, ClientError::DaemonNotRunning(_)) {
            anyhow::anyhow!("{e}\nhint: run `foreman daemon start` first")
        } else {
            anyhow::anyhow!(e)
        }
    })?;
    let response = client.send(command).await?;
    commands::print_response(&response);
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
