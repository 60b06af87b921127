// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.9 Dispatch: turns a spec-poller batch into planner invocations, and
//! classifies work-item status transitions into the auto-dispatch rules the
//! engine root acts on.
//!
//! No teacher counterpart (the teacher's queue dispatch dequeues jobs, not
//! spec files); authored directly from §4.9/§4.12.

use std::collections::{HashMap, HashSet};

use foreman_core::{Event, EventEmitter, SpecPollerBatchResult, WorkItemStatus};

const APPROVED: &str = "approved";

/// What an observed work-item transition should trigger, per §4.12's event
/// handler bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemAction {
    None,
    Cancel,
    DispatchReviewer,
    DispatchImplementor,
}

/// §4.9 state: the latest observed frontmatter status per path, and the set
/// of paths deferred for the next planner dispatch.
#[derive(Debug, Default)]
pub struct Dispatch {
    latest_status: HashMap<String, String>,
    deferred: HashSet<String>,
}

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn deferred_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.deferred.iter().cloned().collect();
        paths.sort();
        paths
    }

    /// §4.9 steps 1-6: record the batch, emit `specChanged` for every
    /// change, and return the path list a planner dispatch should use, or
    /// `None` if nothing is ready (empty deferred set, or a planner already
    /// running).
    pub fn record_batch(
        &mut self,
        batch: &SpecPollerBatchResult,
        emitter: &EventEmitter,
        planner_running: bool,
    ) -> Option<Vec<String>> {
        for change in &batch.changes {
            self.latest_status.insert(change.path.clone(), change.frontmatter_status.clone());
            emitter.emit(&Event::SpecChanged {
                path: change.path.clone(),
                frontmatter_status: change.frontmatter_status.clone(),
                commit_digest: batch.commit_digest.clone(),
            });
            if change.frontmatter_status == APPROVED {
                self.deferred.insert(change.path.clone());
            } else {
                self.deferred.remove(&change.path);
            }
        }

        if self.deferred.is_empty() {
            return None;
        }

        let latest_status = &self.latest_status;
        self.deferred.retain(|path| latest_status.get(path).map(String::as_str) == Some(APPROVED));
        if self.deferred.is_empty() {
            return None;
        }

        if planner_running {
            return None;
        }

        let paths: Vec<String> = self.deferred.drain().collect();
        Some(paths)
    }

    /// §4.9 "handlePlannerFailed": re-add the dispatched paths so the next
    /// cycle retries them.
    pub fn handle_planner_failed(&mut self, spec_paths: &[String]) {
        for path in spec_paths {
            self.deferred.insert(path.clone());
        }
    }

    /// §4.12 event-handler bullets for `workItemChanged`. `agent_running`
    /// reflects whether an implementor/reviewer session already owns this
    /// work item; `is_engine_transition` is true only for the synthetic
    /// transition completion-dispatch emits (which dispatches the reviewer
    /// itself and must not be re-matched here).
    pub fn classify_work_item_transition(
        old_status: Option<WorkItemStatus>,
        new_status: Option<WorkItemStatus>,
        is_engine_transition: bool,
        agent_running: bool,
    ) -> WorkItemAction {
        let Some(new_status) = new_status else {
            return if agent_running { WorkItemAction::Cancel } else { WorkItemAction::None };
        };

        if agent_running {
            return WorkItemAction::None;
        }

        match new_status {
            WorkItemStatus::Review if !is_engine_transition && old_status.is_some() => {
                WorkItemAction::DispatchReviewer
            }
            WorkItemStatus::Unblocked => WorkItemAction::DispatchImplementor,
            _ => WorkItemAction::None,
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
