// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow command surface the engine accepts (§4.10), also used as the
//! wire payload for the daemon/CLI command protocol (§4.14).

use crate::work_item::WorkItemId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    DispatchImplementor { work_item_id: WorkItemId },
    DispatchReviewer { work_item_id: WorkItemId },
    CancelAgent { work_item_id: WorkItemId },
    CancelPlanner,
    Shutdown,
    /// Supplemented (§1.2): read-only status query for operators.
    Status,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::DispatchImplementor { .. } => "dispatch-implementor",
            Command::DispatchReviewer { .. } => "dispatch-reviewer",
            Command::CancelAgent { .. } => "cancel-agent",
            Command::CancelPlanner => "cancel-planner",
            Command::Shutdown => "shutdown",
            Command::Status => "status",
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
