// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    pending = {"pending", WorkItemStatus::Pending},
    unblocked = {"unblocked", WorkItemStatus::Unblocked},
    needs_changes = {"needs-changes", WorkItemStatus::NeedsChanges},
    in_progress = {"in-progress", WorkItemStatus::InProgress},
    review = {"review", WorkItemStatus::Review},
    needs_refinement = {"needs-refinement", WorkItemStatus::NeedsRefinement},
    blocked = {"blocked", WorkItemStatus::Blocked},
    approved = {"approved", WorkItemStatus::Approved},
)]
fn parses_known_status_labels(label: &str, expected: WorkItemStatus) {
    assert_eq!(WorkItemStatus::parse(label), Some(expected));
}

#[test]
fn rejects_unknown_status_label() {
    assert_eq!(WorkItemStatus::parse("nonsense"), None);
}

#[test]
fn status_label_round_trips() {
    for status in [
        WorkItemStatus::Pending,
        WorkItemStatus::Unblocked,
        WorkItemStatus::NeedsChanges,
        WorkItemStatus::InProgress,
        WorkItemStatus::Review,
        WorkItemStatus::NeedsRefinement,
        WorkItemStatus::Blocked,
        WorkItemStatus::Approved,
    ] {
        let label = status.as_label();
        let suffix = label.strip_prefix("status:").unwrap();
        assert_eq!(WorkItemStatus::parse(suffix), Some(status));
    }
}

#[parameterized(
    pending = {WorkItemStatus::Pending, true},
    unblocked = {WorkItemStatus::Unblocked, true},
    needs_changes = {WorkItemStatus::NeedsChanges, true},
    in_progress = {WorkItemStatus::InProgress, true},
    review = {WorkItemStatus::Review, false},
    blocked = {WorkItemStatus::Blocked, false},
)]
fn implementor_eligibility(status: WorkItemStatus, eligible: bool) {
    assert_eq!(status.implementor_eligible(), eligible);
}

#[test]
fn complexity_maps_to_model_override() {
    assert_eq!(Complexity::parse("simple").unwrap().model_override(), "sonnet");
    assert_eq!(Complexity::parse("complex").unwrap().model_override(), "opus");
    assert_eq!(Complexity::parse("unknown"), None);
}

#[test]
fn work_item_id_displays_as_number() {
    assert_eq!(WorkItemId::new(42).to_string(), "42");
}
