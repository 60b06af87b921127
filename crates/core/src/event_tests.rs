// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_work_item_changed() -> Event {
    Event::WorkItemChanged {
        work_item_id: WorkItemId::new(42),
        old_status: Some(WorkItemStatus::InProgress),
        new_status: Some(WorkItemStatus::Review),
        work_item: None,
        is_recovery: false,
        is_engine_transition: true,
    }
}

#[test]
fn work_item_id_extracted_from_work_item_changed() {
    assert_eq!(sample_work_item_changed().work_item_id(), Some(WorkItemId::new(42)));
}

#[test]
fn work_item_id_extracted_from_agent_events() {
    let started = Event::AgentStarted {
        role: AgentRole::Implementor,
        session_id: SessionId::new("s1"),
        work_item_id: Some(WorkItemId::new(7)),
        spec_paths: None,
        branch_name: Some("issue-7".into()),
        log_file_path: None,
        started_at: Utc::now(),
    };
    assert_eq!(started.work_item_id(), Some(WorkItemId::new(7)));
}

#[test]
fn spec_changed_has_no_work_item_id() {
    let e = Event::SpecChanged {
        path: "docs/specs/a.md".into(),
        frontmatter_status: "approved".into(),
        commit_digest: "abc".into(),
    };
    assert_eq!(e.work_item_id(), None);
}

#[test]
fn only_agent_completed_and_failed_are_terminal() {
    assert!(!sample_work_item_changed().is_terminal_agent_event());

    let completed = Event::AgentCompleted {
        role: AgentRole::Planner,
        session_id: SessionId::new("s1"),
        work_item_id: None,
        spec_paths: Some(vec!["a.md".into()]),
    };
    assert!(completed.is_terminal_agent_event());

    let failed = Event::AgentFailed {
        role: AgentRole::Planner,
        session_id: SessionId::new(""),
        work_item_id: None,
        spec_paths: Some(vec!["a.md".into()]),
        error: "boom".into(),
    };
    assert!(failed.is_terminal_agent_event());
}

#[test]
fn kind_is_stable_per_variant() {
    assert_eq!(sample_work_item_changed().kind(), "workItemChanged");
}

#[test]
fn event_serializes_round_trip() {
    let e = sample_work_item_changed();
    let json = serde_json::to_string(&e).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
}
