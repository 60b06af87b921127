// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.13's PID-lockfile "already running" detection and log rotation,
//! grounded in the teacher's `lifecycle.rs`/`main.rs` (`try_lock_exclusive`
//! plus a shifted-rotation log file), narrowed: this daemon keeps no WAL or
//! snapshot, so there is nothing here beyond the lock file and the log.

use std::fs::File;
use std::path::Path;

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another daemon is already running for this repository")]
    AlreadyRunning,
    #[error("failed to create daemon state directory: {0}")]
    StateDir(#[source] std::io::Error),
    #[error("failed to open or lock PID file: {0}")]
    Lock(#[source] std::io::Error),
    #[error("failed to bind daemon socket at {path}: {source}")]
    Bind {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holds the exclusive lock for as long as the daemon runs; dropping it
/// releases the lock (OS-level, survives a process that forgets to clean
/// up its own PID file).
pub struct PidLock {
    _file: File,
}

/// Acquires the exclusive PID lock at `lock_path`, creating `state_dir` if
/// needed, and writes the current PID into the file. Fails with
/// [`LifecycleError::AlreadyRunning`] if another daemon already holds it.
pub fn acquire_pid_lock(state_dir: &Path, lock_path: &Path) -> Result<PidLock, LifecycleError> {
    std::fs::create_dir_all(state_dir).map_err(LifecycleError::StateDir)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)
        .map_err(LifecycleError::Lock)?;

    file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning)?;

    use std::io::{Seek, SeekFrom, Write};
    let mut file = file;
    file.set_len(0).map_err(LifecycleError::Lock)?;
    file.seek(SeekFrom::Start(0)).map_err(LifecycleError::Lock)?;
    write!(file, "{}", std::process::id()).map_err(LifecycleError::Lock)?;

    Ok(PidLock { _file: file })
}

/// Reads the PID recorded by a currently-running daemon, for the
/// human-readable "already running" message.
pub fn read_lock_pid(lock_path: &Path) -> Option<String> {
    std::fs::read_to_string(lock_path).ok().map(|s| s.trim().to_string())
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotates `daemon.log` → `daemon.log.1` → ... before the tracing
/// subscriber opens it, the way the teacher's `rotate_log_if_needed` does.
/// Best-effort: rotation failures never block startup.
pub fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
