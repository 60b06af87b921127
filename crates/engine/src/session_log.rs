// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session append-only agent log (§4.8 "initialize the session log file
//! with a header" / "completed"/"failed"/"cancelled" footers).
//!
//! Grounded in the teacher's `pipeline_logger.rs`: each `append*` call
//! opens, writes, and closes the file rather than holding it open, and
//! failures are logged via `tracing::warn!` instead of propagating — a
//! session log that can't be written must never take the agent run down
//! with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use foreman_core::{AgentRole, Clock, SessionId};

/// Build `<logs_dir>/agent/<session_id>.log`, mirroring the teacher's
/// `log_paths::agent_log_path`.
pub fn session_log_path(logs_dir: &Path, session_id: &SessionId) -> PathBuf {
    logs_dir.join("agent").join(format!("{}.log", session_id.as_str()))
}

pub struct SessionLog<C: Clock> {
    path: PathBuf,
    clock: C,
}

impl<C: Clock> SessionLog<C> {
    pub fn new(path: PathBuf, clock: C) -> Self {
        Self { path, clock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_header(&self, role: AgentRole, work_item_id: Option<u64>) {
        let subject =
            work_item_id.map(|id| format!(" for work item #{id}")).unwrap_or_default();
        self.write_line(&format!("=== {role} session started{subject} ==="));
    }

    pub fn append_text(&self, chunk: &str) {
        for line in chunk.lines() {
            self.write_line(line);
        }
    }

    pub fn append_tool_use(&self, tool_name: &str) {
        self.write_line(&format!("[tool] {tool_name}"));
    }

    pub fn append_unknown(&self, message_type: &str, raw: &str) {
        self.write_line(&format!("UNKNOWN {message_type}: {raw}"));
    }

    pub fn write_footer(&self, outcome: &str) {
        self.write_line(&format!("=== session {outcome} ==="));
    }

    fn write_line(&self, line: &str) {
        if let Err(e) = self.try_write_line(line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write session log line");
        }
    }

    fn try_write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{} {}", self.clock.now().to_rfc3339(), line)
    }
}

#[cfg(test)]
#[path = "session_log_tests.rs"]
mod tests;
