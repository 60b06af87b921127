// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.11 Recovery: startup label reset for orphaned `in-progress` work
//! items, and per-event crash recovery run after every terminal agent
//! event. No teacher counterpart (the teacher's recovery story is WAL
//! replay, dropped with `oj-storage`); both procedures are authored
//! directly from §4.11.

use foreman_adapters::TrackerClient;
use foreman_core::{Event, EventEmitter, WorkItemStatus};

use crate::pollers::work_item::WorkItemSnapshotMut;

const STATUS_IN_PROGRESS: &str = "status:in-progress";
const STATUS_PENDING: &str = "status:pending";

/// Startup recovery (§4.11, §4.12 step 3): every open issue still labeled
/// `status:in-progress` when the engine starts is an orphan from a crash.
/// Reset each to `pending`, emit a synthetic `workItemChanged` for it, and
/// return the count recovered.
pub async fn startup_recovery<T: TrackerClient>(tracker: &T, emitter: &EventEmitter) -> usize {
    let issues = match tracker.list_open_issues_by_label(STATUS_IN_PROGRESS).await {
        Ok(issues) => issues,
        Err(e) => {
            tracing::warn!(error = %e, "startup recovery failed to list in-progress issues");
            return 0;
        }
    };

    let mut recovered = 0;
    for issue in &issues {
        if let Err(e) = reset_to_pending(tracker, issue.number).await {
            tracing::warn!(issue = issue.number, error = %e, "startup recovery failed to reset labels");
            continue;
        }

        let work_item_id = foreman_core::WorkItemId::new(issue.number);
        emitter.emit(&Event::WorkItemChanged {
            work_item_id,
            old_status: Some(WorkItemStatus::InProgress),
            new_status: Some(WorkItemStatus::Pending),
            work_item: None,
            is_recovery: true,
            is_engine_transition: false,
        });
        recovered += 1;
    }
    recovered
}

/// Crash recovery (§4.11, §4.12 event handler): run after every terminal
/// agent event carrying a work-item id. If the poller's snapshot still
/// shows `in-progress` for this work item and no agent owns it, the
/// implementor/reviewer that was supposed to move it on crashed or was
/// killed without a chance to update the tracker; reset it to `pending` so
/// it is not orphaned. `agent_running` reflects the agent manager's
/// `is_running_for_work_item` check, taken *after* completion-dispatch has
/// had a chance to pre-sync the snapshot, per §4.12.
pub async fn crash_recovery<T: TrackerClient>(
    tracker: &T,
    emitter: &EventEmitter,
    mut snapshot: WorkItemSnapshotMut<'_>,
    work_item_id: foreman_core::WorkItemId,
    current_status: Option<WorkItemStatus>,
    agent_running: bool,
) {
    if agent_running || current_status != Some(WorkItemStatus::InProgress) {
        return;
    }

    if let Err(e) = reset_to_pending(tracker, work_item_id.get()).await {
        tracing::warn!(%work_item_id, error = %e, "crash recovery failed to reset labels");
        return;
    }

    snapshot.set_status(work_item_id, WorkItemStatus::Pending);
    emitter.emit(&Event::WorkItemChanged {
        work_item_id,
        old_status: Some(WorkItemStatus::InProgress),
        new_status: Some(WorkItemStatus::Pending),
        work_item: None,
        is_recovery: true,
        is_engine_transition: false,
    });
}

async fn reset_to_pending<T: TrackerClient>(
    tracker: &T,
    issue_number: u64,
) -> Result<(), foreman_adapters::TrackerError> {
    tracker.remove_label(issue_number, STATUS_IN_PROGRESS).await?;
    tracker.add_label(issue_number, STATUS_PENDING).await?;
    Ok(())
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
