// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only status snapshot (§1.2, §4.10 `Command::Status`). Supplemented:
//! the distilled spec names only the five mutating commands, but an
//! operator-facing daemon needs a way to ask "what is running right now"
//! without mutating anything.

use serde::{Deserialize, Serialize};

use crate::session::AgentSessionInfo;

/// Snapshot returned by the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub work_item_count: usize,
    pub planner_running: bool,
    pub sessions: Vec<AgentSessionInfo>,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
