// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_core::{SpecChange, SpecChangeKind};
use parking_lot::Mutex;
use std::sync::Arc;

fn change(path: &str, status: &str, kind: SpecChangeKind) -> SpecChange {
    SpecChange {
        path: path.to_string(),
        blob_digest: "deadbeef".to_string(),
        frontmatter_status: status.to_string(),
        kind,
    }
}

fn spec_events(emitter: &EventEmitter) -> Arc<Mutex<Vec<Event>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&events);
    emitter.subscribe(move |event| captured.lock().push(event.clone()));
    events
}

#[test]
fn empty_batch_with_no_prior_deferrals_returns_none() {
    let mut dispatch = Dispatch::new();
    let emitter = EventEmitter::new();
    let result = dispatch.record_batch(&SpecPollerBatchResult::default(), &emitter, false);
    assert_eq!(result, None);
}

#[test]
fn approved_change_dispatches_and_emits_spec_changed() {
    let mut dispatch = Dispatch::new();
    let emitter = EventEmitter::new();
    let events = spec_events(&emitter);

    let batch = SpecPollerBatchResult {
        changes: vec![change("docs/specs/a.md", "approved", SpecChangeKind::Added)],
        commit_digest: "c1".to_string(),
    };
    let result = dispatch.record_batch(&batch, &emitter, false);

    assert_eq!(result, Some(vec!["docs/specs/a.md".to_string()]));
    assert!(dispatch.deferred_paths().is_empty());
    assert!(matches!(events.lock()[0], Event::SpecChanged { .. }));
}

#[test]
fn planner_running_leaves_deferred_set_intact() {
    let mut dispatch = Dispatch::new();
    let emitter = EventEmitter::new();

    let batch = SpecPollerBatchResult {
        changes: vec![change("docs/specs/a.md", "approved", SpecChangeKind::Added)],
        commit_digest: "c1".to_string(),
    };
    let result = dispatch.record_batch(&batch, &emitter, true);

    assert_eq!(result, None);
    assert_eq!(dispatch.deferred_paths(), vec!["docs/specs/a.md".to_string()]);
}

#[test]
fn second_cycle_defers_until_status_flips_back_to_approved() {
    let mut dispatch = Dispatch::new();
    let emitter = EventEmitter::new();

    // cycle 1: planner busy, a.md deferred
    let batch1 = SpecPollerBatchResult {
        changes: vec![change("docs/specs/a.md", "approved", SpecChangeKind::Added)],
        commit_digest: "c1".to_string(),
    };
    assert_eq!(dispatch.record_batch(&batch1, &emitter, true), None);

    // cycle 2: a.md flips to draft before the planner ever ran
    let batch2 = SpecPollerBatchResult {
        changes: vec![change("docs/specs/a.md", "draft", SpecChangeKind::Modified)],
        commit_digest: "c2".to_string(),
    };
    let result = dispatch.record_batch(&batch2, &emitter, false);
    assert_eq!(result, None);
    assert!(dispatch.deferred_paths().is_empty());
}

#[test]
fn handle_planner_failed_requeues_paths_for_retry() {
    let mut dispatch = Dispatch::new();
    dispatch.handle_planner_failed(&["docs/specs/a.md".to_string()]);
    assert_eq!(dispatch.deferred_paths(), vec!["docs/specs/a.md".to_string()]);
}

#[test]
fn classify_disappearance_with_running_agent_cancels() {
    let action =
        Dispatch::classify_work_item_transition(Some(WorkItemStatus::InProgress), None, false, true);
    assert_eq!(action, WorkItemAction::Cancel);
}

#[test]
fn classify_disappearance_with_no_agent_does_nothing() {
    let action =
        Dispatch::classify_work_item_transition(Some(WorkItemStatus::InProgress), None, false, false);
    assert_eq!(action, WorkItemAction::None);
}

#[test]
fn classify_external_transition_to_review_dispatches_reviewer() {
    let action = Dispatch::classify_work_item_transition(
        Some(WorkItemStatus::InProgress),
        Some(WorkItemStatus::Review),
        false,
        false,
    );
    assert_eq!(action, WorkItemAction::DispatchReviewer);
}

#[test]
fn classify_synthetic_engine_transition_to_review_is_not_redispatched() {
    let action = Dispatch::classify_work_item_transition(
        Some(WorkItemStatus::InProgress),
        Some(WorkItemStatus::Review),
        true,
        false,
    );
    assert_eq!(action, WorkItemAction::None);
}

#[test]
fn classify_first_observation_in_review_does_not_dispatch() {
    let action =
        Dispatch::classify_work_item_transition(None, Some(WorkItemStatus::Review), false, false);
    assert_eq!(action, WorkItemAction::None);
}

#[test]
fn classify_transition_to_unblocked_dispatches_implementor() {
    let action = Dispatch::classify_work_item_transition(
        Some(WorkItemStatus::Blocked),
        Some(WorkItemStatus::Unblocked),
        false,
        false,
    );
    assert_eq!(action, WorkItemAction::DispatchImplementor);
}

#[test]
fn classify_with_agent_already_running_does_nothing() {
    let action = Dispatch::classify_work_item_transition(
        Some(WorkItemStatus::Blocked),
        Some(WorkItemStatus::Unblocked),
        false,
        true,
    );
    assert_eq!(action, WorkItemAction::None);
}
