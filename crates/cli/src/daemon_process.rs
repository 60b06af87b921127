// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process management: starting, stopping, and locating `foremand`.
//! Grounded in the teacher's `daemon_process.rs`, narrowed to a single
//! per-repository daemon (no user-level daemon-dir resolution — the socket
//! lives under the config's `repo_root/.foreman/`).

use std::path::PathBuf;
use std::process::Command as ProcessCommand;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::client::ClientError;

/// Spawns `foremand` in the background, redirecting its standard streams
/// away from the terminal so the CLI can return immediately.
pub fn start_daemon_background(config_path: &std::path::Path) -> Result<std::process::Child, ClientError> {
    let foremand = find_foremand_binary();
    ProcessCommand::new(&foremand)
        .arg(config_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(ClientError::Io)
}

/// Sends SIGTERM to the PID recorded in `lock_path` and waits (bounded) for
/// it to exit, falling back to no-op if nothing is running.
pub fn stop_daemon_sync(lock_path: &std::path::Path) {
    let Some(pid) = read_daemon_pid(lock_path) else { return };

    let _ = signal::kill(pid, Signal::SIGTERM);

    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        if !process_exists(pid) {
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let _ = signal::kill(pid, Signal::SIGKILL);
}

fn read_daemon_pid(lock_path: &std::path::Path) -> Option<Pid> {
    let raw: i32 = std::fs::read_to_string(lock_path).ok()?.trim().parse().ok()?;
    Some(Pid::from_raw(raw))
}

fn process_exists(pid: Pid) -> bool {
    // Signal 0 probes liveness without actually signalling the process.
    signal::kill(pid, None).is_ok()
}

/// Locates the `foremand` binary: next to the running `foreman` binary
/// first (the common installed-together layout), then `PATH`.
pub(crate) fn find_foremand_binary() -> PathBuf {
    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let sibling = dir.join("foremand");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("foremand")
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
