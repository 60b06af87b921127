// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent session data model (§3).

use crate::work_item::WorkItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Identifier assigned by the agent SDK, observed on `system.init`.
    #[derive(Default)]
    pub struct SessionId;
}

/// The three classes of agent this system schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Implementor,
    Reviewer,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Implementor => "implementor",
            Self::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `status ∈ {requested, running, completed, failed, cancelled}` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Requested,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Requested | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// `{role, sessionID, status, workItemID?, specPaths?, branchName?,
/// logFilePath?, startedAt}` (§3). This is the plain-data projection used in
/// events and status queries; the live session (cancellation token, timer,
/// output buffer, listeners) is owned by `foreman-engine`'s agent manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSessionInfo {
    pub role: AgentRole,
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub work_item_id: Option<WorkItemId>,
    pub spec_paths: Option<Vec<String>>,
    pub branch_name: Option<String>,
    pub log_file_path: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
