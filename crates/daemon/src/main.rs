// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! foreman daemon (`foremand`)
//!
//! Background process that owns the Engine Root and its event loop.
//! Grounded in the teacher's `daemon/src/main.rs`: version/help flags
//! handled before any config/lock acquisition, log rotation before the
//! tracing subscriber is installed, a PID lockfile guarding against a
//! second daemon for the same repository, a `READY` line on stdout once
//! the first poll cycle completes, and SIGTERM/SIGINT routed into the same
//! shutdown path as a CLI-issued `shutdown` command.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use foreman_adapters::tracker::GitHubAppCredentials;
use foreman_adapters::{ClaudeAgentSdk, GitHubTrackerClient};
use foreman_core::config::Config;
use foreman_core::SystemClock;
use foreman_engine::prompt::DefaultPromptBuilder;
use foreman_engine::Engine;

use foreman_daemon::lifecycle::{self, LifecycleError};
use foreman_daemon::listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("foremand {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            other if !other.starts_with('-') => {
                // Treated as the config path; fall through below.
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: foremand [CONFIG_PATH] [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config_path = std::env::args()
        .nth(1)
        .filter(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("foreman.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("foremand: failed to load config {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    let state_dir = config.daemon_state_dir();
    let log_path = config.daemon_log_path();
    lifecycle::rotate_log_if_needed(&log_path);

    let _lock = match lifecycle::acquire_pid_lock(&state_dir, &config.daemon_lock_path()) {
        Ok(lock) => lock,
        Err(LifecycleError::AlreadyRunning) => {
            let pid = lifecycle::read_lock_pid(&config.daemon_lock_path()).unwrap_or_default();
            eprintln!("foremand is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("foremand: failed to acquire startup lock: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = setup_logging(&log_path, &config.log_level)?;
    info!(repository = %config.repository, "starting foreman daemon");

    let socket_path = config.daemon_socket_path();
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let unix_listener = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::Bind { path: socket_path.clone(), source: e })?;

    let credentials = GitHubAppCredentials {
        app_id: config.app_id.clone(),
        private_key_path: config.private_key_path.clone(),
        installation_id: config.installation_id.clone(),
    };
    let tracker = Arc::new(GitHubTrackerClient::new(&config.repository, credentials)?);
    let sdk = ClaudeAgentSdk::new();
    let prompts = Arc::new(DefaultPromptBuilder);

    let (engine, command_rx) = Engine::new(tracker, config, sdk, prompts, SystemClock);
    let engine = Arc::new(engine);

    let summary = engine.start().await;
    info!(
        work_items = summary.work_item_count,
        recoveries = summary.recoveries,
        "startup poll cycle complete"
    );

    tokio::spawn(listener::run(unix_listener, engine.command_sender()));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown_engine = Arc::clone(&engine);
    let shutdown_tx = engine.command_sender();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
        let (respond_to, _recv) = tokio::sync::oneshot::channel();
        let _ = shutdown_tx
            .send(foreman_engine::EngineCommand { command: foreman_core::Command::Shutdown, respond_to })
            .await;
        drop(shutdown_engine);
    });

    println!("READY");

    engine.run(command_rx).await;

    let _ = std::fs::remove_file(&socket_path);
    info!("foreman daemon stopped");
    Ok(())
}

fn print_help() {
    println!("foremand {}", env!("CARGO_PKG_VERSION"));
    println!("Background process that owns the orchestration engine and its event loop.");
    println!();
    println!("USAGE:");
    println!("    foremand [CONFIG_PATH]");
    println!();
    println!("The daemon is typically started by the `foreman daemon start` CLI command");
    println!("and should not be invoked directly. It listens on a Unix socket for the");
    println!("commands described in the command protocol.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn setup_logging(
    log_path: &std::path::Path,
    log_level: &str,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or("daemon log path has no parent directory")?,
        log_path.file_name().ok_or("daemon log path has no file name")?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
