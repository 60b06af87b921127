// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events (§3 Agent Session, §4.1 Event Emitter, §4.9/§4.12 handlers).
//!
//! `Event` is the single sum type that flows poller -> event-queue ->
//! state-update -> handlers, and that the synchronous [`crate::event_emitter`]
//! fans out to subscribers.

use crate::revision::{PipelineStatus, RevisionId};
use crate::session::{AgentRole, SessionId};
use crate::work_item::{WorkItem, WorkItemId, WorkItemStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// §4.5/§4.9/§4.12: a work item was first observed, changed status (or
    /// priority/complexity label), or disappeared (`new_status: None`).
    WorkItemChanged {
        work_item_id: WorkItemId,
        old_status: Option<WorkItemStatus>,
        new_status: Option<WorkItemStatus>,
        work_item: Option<WorkItem>,
        /// True for the startup-recovery synthetic transition (§4.11).
        is_recovery: bool,
        /// True for the completion-dispatch synthetic transition (§4.12).
        is_engine_transition: bool,
    },

    /// §4.9: emitted for every change in a spec-poller batch, for UI history.
    SpecChanged {
        path: String,
        frontmatter_status: String,
        commit_digest: String,
    },

    /// §4.7: a new open revision was observed.
    RevisionDetected { revision_id: RevisionId },

    /// §4.7: a previously-open revision disappeared.
    RevisionRemoved { revision_id: RevisionId },

    /// §4.7: a revision's derived pipeline status transitioned.
    RevisionStatusChanged {
        revision_id: RevisionId,
        old_status: Option<PipelineStatus>,
        new_status: Option<PipelineStatus>,
    },

    /// §4.8: emitted once a `system.init` message is observed. Strictly
    /// precedes any chunk emission or terminal event for the same session.
    AgentStarted {
        role: AgentRole,
        session_id: SessionId,
        work_item_id: Option<WorkItemId>,
        spec_paths: Option<Vec<String>>,
        branch_name: Option<String>,
        log_file_path: Option<String>,
        started_at: DateTime<Utc>,
    },

    /// §4.8: exactly one terminal event per session, success case.
    AgentCompleted {
        role: AgentRole,
        session_id: SessionId,
        work_item_id: Option<WorkItemId>,
        spec_paths: Option<Vec<String>>,
    },

    /// §4.8: exactly one terminal event per session, failure case. A session
    /// that failed before a working copy/install succeeded carries an empty
    /// `session_id` (§4.8 step 2, §7).
    AgentFailed {
        role: AgentRole,
        session_id: SessionId,
        work_item_id: Option<WorkItemId>,
        spec_paths: Option<Vec<String>>,
        error: String,
    },
}

impl Event {
    /// The work item this event pertains to, if any — used to drive crash
    /// recovery (§4.11) for every terminal event carrying one.
    pub fn work_item_id(&self) -> Option<WorkItemId> {
        match self {
            Event::WorkItemChanged { work_item_id, .. } => Some(*work_item_id),
            Event::AgentStarted { work_item_id, .. }
            | Event::AgentCompleted { work_item_id, .. }
            | Event::AgentFailed { work_item_id, .. } => *work_item_id,
            _ => None,
        }
    }

    /// Is this a terminal agent event (`agentCompleted`/`agentFailed`)? Used
    /// by the event queue's shutdown-drain predicate (§4.2, §4.12).
    pub fn is_terminal_agent_event(&self) -> bool {
        matches!(self, Event::AgentCompleted { .. } | Event::AgentFailed { .. })
    }

    /// A short, stable tag for logging ("dropped event of type ...", §4.2).
    pub fn kind(&self) -> &'static str {
        match self {
            Event::WorkItemChanged { .. } => "workItemChanged",
            Event::SpecChanged { .. } => "specChanged",
            Event::RevisionDetected { .. } => "revisionDetected",
            Event::RevisionRemoved { .. } => "revisionRemoved",
            Event::RevisionStatusChanged { .. } => "revisionStatusChanged",
            Event::AgentStarted { .. } => "agentStarted",
            Event::AgentCompleted { .. } => "agentCompleted",
            Event::AgentFailed { .. } => "agentFailed",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
