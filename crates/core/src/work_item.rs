// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work item data model: the tracked unit of development work derived from
//! an open issue carrying the `task:implement` label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identity of a work item, i.e. the issue number on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkItemId(pub u64);

impl WorkItemId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of work-item statuses, derived from `status:<name>` labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkItemStatus {
    Pending,
    Unblocked,
    NeedsChanges,
    InProgress,
    Review,
    NeedsRefinement,
    Blocked,
    Approved,
}

impl WorkItemStatus {
    /// Parse from the suffix of a `status:<name>` label, e.g. `"in-progress"`.
    pub fn parse(label: &str) -> Option<Self> {
        Some(match label {
            "pending" => Self::Pending,
            "unblocked" => Self::Unblocked,
            "needs-changes" => Self::NeedsChanges,
            "in-progress" => Self::InProgress,
            "review" => Self::Review,
            "needs-refinement" => Self::NeedsRefinement,
            "blocked" => Self::Blocked,
            "approved" => Self::Approved,
            _ => return None,
        })
    }

    /// The `status:<name>` label string for this status.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Pending => "status:pending",
            Self::Unblocked => "status:unblocked",
            Self::NeedsChanges => "status:needs-changes",
            Self::InProgress => "status:in-progress",
            Self::Review => "status:review",
            Self::NeedsRefinement => "status:needs-refinement",
            Self::Blocked => "status:blocked",
            Self::Approved => "status:approved",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Unblocked => "unblocked",
            Self::NeedsChanges => "needs-changes",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::NeedsRefinement => "needs-refinement",
            Self::Blocked => "blocked",
            Self::Approved => "approved",
        }
    }

    /// Statuses `dispatchImplementor` (§4.10) will accept.
    pub fn implementor_eligible(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Unblocked | Self::NeedsChanges | Self::InProgress
        )
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complexity label, used by §4.10 to select a model override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Complex,
}

impl Complexity {
    pub fn parse(label: &str) -> Option<Self> {
        Some(match label {
            "simple" => Self::Simple,
            "complex" => Self::Complex,
            _ => return None,
        })
    }

    /// The model-name override this complexity maps to in prompt dispatch.
    pub fn model_override(&self) -> &'static str {
        match self {
            Self::Simple => "sonnet",
            Self::Complex => "opus",
        }
    }
}

/// `{id, title, body, status, priority, complexity, blockedBy[], createdAt}`
/// per §3. Tracked iff it carries `task:implement` and is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    pub body: String,
    pub status: WorkItemStatus,
    pub priority: Option<String>,
    pub complexity: Option<Complexity>,
    pub blocked_by: Vec<WorkItemId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
