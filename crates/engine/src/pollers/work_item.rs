// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.5 Work-Item Poller: diffs open issues carrying `task:implement`
//! against an in-memory snapshot and emits `workItemChanged`.
//!
//! The teacher workspace has no tracker poller to ground this on, so the
//! diff algorithm is authored directly from §4.5; the read-only/mutable
//! snapshot split mirrors the `lock_state`/`lock_state_mut` pair the
//! teacher's own runtime module uses for its in-memory state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use foreman_adapters::{TrackerClient, TrackerIssue};
use foreman_core::{Clock, Complexity, Event, WorkItem, WorkItemId, WorkItemStatus};

const TRACKED_LABEL: &str = "task:implement";

/// Build the work-item data-model projection (§3) from a fetched issue.
/// Unrecognized `status:<x>`/`complexity:<x>` labels are ignored; an issue
/// with no `status:` label is treated as freshly filed (`pending`).
///
/// The narrow `TrackerIssue` shape (§6) does not carry a `created_at`
/// field, so `poll()` passes the first-observation timestamp on first
/// sight and the snapshot's stored value on every poll after that — the
/// caller stamps it, never this function, so it stays stable across polls.
pub fn work_item_from_issue(issue: &TrackerIssue, created_at: DateTime<Utc>) -> WorkItem {
    let mut status = WorkItemStatus::Pending;
    let mut priority = None;
    let mut complexity = None;
    for label in &issue.labels {
        if let Some(suffix) = label.name.strip_prefix("status:") {
            if let Some(parsed) = WorkItemStatus::parse(suffix) {
                status = parsed;
            }
        } else if let Some(suffix) = label.name.strip_prefix("priority:") {
            priority = Some(suffix.to_string());
        } else if let Some(suffix) = label.name.strip_prefix("complexity:") {
            complexity = Complexity::parse(suffix);
        }
    }

    WorkItem {
        id: WorkItemId::new(issue.number),
        title: issue.title.clone(),
        body: issue.body.clone().unwrap_or_default(),
        status,
        priority,
        complexity,
        blocked_by: Vec::new(),
        created_at,
    }
}

/// Read-only view of the poller's snapshot (used by dispatch/commands to
/// gate on a work item's current status without mutating it).
pub struct WorkItemSnapshotView<'a>(&'a HashMap<WorkItemId, WorkItem>);

impl WorkItemSnapshotView<'_> {
    pub fn get(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mutable view, used by completion-dispatch to pre-sync a status
/// transition before the next poll observes it (§4.5, §4.12).
pub struct WorkItemSnapshotMut<'a>(&'a mut HashMap<WorkItemId, WorkItem>);

impl WorkItemSnapshotMut<'_> {
    pub fn set_status(&mut self, id: WorkItemId, status: WorkItemStatus) {
        if let Some(item) = self.0.get_mut(&id) {
            item.status = status;
        }
    }
}

pub struct WorkItemPoller<T: TrackerClient, C: Clock> {
    tracker: Arc<T>,
    clock: C,
    snapshot: HashMap<WorkItemId, WorkItem>,
}

impl<T: TrackerClient, C: Clock> WorkItemPoller<T, C> {
    pub fn new(tracker: Arc<T>, clock: C) -> Self {
        Self { tracker, clock, snapshot: HashMap::new() }
    }

    pub fn snapshot(&self) -> WorkItemSnapshotView<'_> {
        WorkItemSnapshotView(&self.snapshot)
    }

    pub fn snapshot_mut(&mut self) -> WorkItemSnapshotMut<'_> {
        WorkItemSnapshotMut(&mut self.snapshot)
    }

    /// Fetch open `task:implement` issues and diff against the snapshot
    /// (§4.5). On a tracker error the cycle is skipped and the snapshot is
    /// left untouched.
    pub async fn poll(&mut self) -> Vec<Event> {
        let issues = match self.tracker.list_open_issues_by_label(TRACKED_LABEL).await {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!(error = %e, "work-item poll failed, skipping cycle");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for issue in &issues {
            let id = WorkItemId::new(issue.number);
            let created_at = self.snapshot.get(&id).map(|w| w.created_at).unwrap_or_else(|| self.clock.now());
            let work_item = work_item_from_issue(issue, created_at);
            seen.insert(id);

            match self.snapshot.get(&id) {
                None => {
                    events.push(Event::WorkItemChanged {
                        work_item_id: id,
                        old_status: None,
                        new_status: Some(work_item.status),
                        work_item: Some(work_item.clone()),
                        is_recovery: false,
                        is_engine_transition: false,
                    });
                }
                Some(prev) => {
                    let changed = prev.status != work_item.status
                        || prev.priority != work_item.priority
                        || prev.complexity != work_item.complexity;
                    if changed {
                        events.push(Event::WorkItemChanged {
                            work_item_id: id,
                            old_status: Some(prev.status),
                            new_status: Some(work_item.status),
                            work_item: Some(work_item.clone()),
                            is_recovery: false,
                            is_engine_transition: false,
                        });
                    }
                }
            }
            self.snapshot.insert(id, work_item);
        }

        let removed: Vec<WorkItemId> =
            self.snapshot.keys().filter(|id| !seen.contains(id)).copied().collect();
        for id in removed {
            let old_status = self.snapshot.remove(&id).map(|w| w.status);
            events.push(Event::WorkItemChanged {
                work_item_id: id,
                old_status,
                new_status: None,
                work_item: None,
                is_recovery: false,
                is_engine_transition: false,
            });
        }

        events
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
