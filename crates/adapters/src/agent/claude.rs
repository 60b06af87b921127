// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed [`AgentSdk`] (§6 "Agent SDK").
//!
//! Spawns the agent CLI with `--output-format stream-json`, reads
//! newline-delimited JSON from its stdout, and parses each line via
//! [`super::parse_message`]. `interrupt()` sends `SIGTERM` to the child and
//! escalates to `SIGKILL` after a grace period if it hasn't exited.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{AgentMessage, AgentSdk, AgentSdkError, QueryHandle, QueryParams};

const INTERRUPT_GRACE_PERIOD: Duration = Duration::from_secs(10);
const CHANNEL_CAPACITY: usize = 64;

/// Name of the agent CLI binary, resolved via `PATH`.
const AGENT_BINARY: &str = "claude";

#[derive(Debug, Clone)]
pub struct ClaudeAgentSdk;

impl ClaudeAgentSdk {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClaudeAgentSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentSdk for ClaudeAgentSdk {
    async fn query(&self, params: QueryParams) -> Result<QueryHandle, AgentSdkError> {
        let mut command = Command::new(AGENT_BINARY);
        command
            .current_dir(&params.cwd)
            .arg("--print")
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .arg("--agent")
            .arg(&params.agent_name);
        if let Some(model) = &params.model_override {
            command.arg("--model").arg(model);
        }
        command
            .arg(&params.prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| AgentSdkError::SpawnFailed(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentSdkError::SpawnFailed("child has no stdout".to_string()))?;
        let stderr = child.stderr.take();

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let pid = child.id();
        let reader_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                tokio::spawn(async move {
                    while let Ok(Some(line)) = lines.next_line().await {
                        debug!(agent_stderr = %line, "agent stderr");
                    }
                });
            }

            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    biased;
                    _ = reader_cancel.cancelled() => {
                        if let Some(pid) = pid {
                            send_interrupt(pid).await;
                        }
                        break;
                    }
                    line = lines.next_line() => {
                        match line {
                            Ok(Some(line)) => {
                                if line.trim().is_empty() {
                                    continue;
                                }
                                match serde_json::from_str::<serde_json::Value>(&line) {
                                    Ok(value) => {
                                        let message = super::parse_message(&value);
                                        if tx.send(message).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        warn!(error = %e, raw = %line, "failed to parse agent output line");
                                        let _ = tx
                                            .send(AgentMessage::Unknown { raw: line })
                                            .await;
                                    }
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                warn!(error = %e, "agent stdout read error");
                                break;
                            }
                        }
                    }
                }
            }

            let _ = child.wait().await;
        });

        Ok(QueryHandle { rx, cancel })
    }
}

const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Signals SIGTERM, then polls for the process to exit (by probing with
/// signal 0) every [`INTERRUPT_POLL_INTERVAL`] up to [`INTERRUPT_GRACE_PERIOD`],
/// escalating to SIGKILL if it's still alive at the deadline.
async fn send_interrupt(pid: u32) {
    let pid = Pid::from_raw(pid as i32);
    if kill(pid, Signal::SIGTERM).is_err() {
        return;
    }
    let deadline = tokio::time::Instant::now() + INTERRUPT_GRACE_PERIOD;
    while tokio::time::Instant::now() < deadline {
        if kill(pid, None).is_err() {
            return; // process is gone
        }
        tokio::time::sleep(INTERRUPT_POLL_INTERVAL).await;
    }
    let _ = kill(pid, Signal::SIGKILL);
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
