// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_adapters::{FakeTrackerClient, TrackerIssue, TrackerLabel};
use foreman_core::FakeClock;

fn issue(number: u64, labels: &[&str]) -> TrackerIssue {
    TrackerIssue {
        number,
        title: format!("issue {number}"),
        body: Some("body".to_string()),
        state: "open".to_string(),
        labels: labels.iter().map(|l| TrackerLabel { name: l.to_string() }).collect(),
        html_url: format!("https://example.invalid/issues/{number}"),
    }
}

#[tokio::test]
async fn first_observation_emits_with_old_status_none() {
    let tracker = Arc::new(
        FakeTrackerClient::new().with_issue(issue(1, &["task:implement", "status:pending"])),
    );
    let mut poller = WorkItemPoller::new(tracker, FakeClock::default());
    let events = poller.poll().await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::WorkItemChanged { old_status, new_status, work_item_id, .. } => {
            assert_eq!(*old_status, None);
            assert_eq!(*new_status, Some(WorkItemStatus::Pending));
            assert_eq!(*work_item_id, WorkItemId::new(1));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn unchanged_issue_emits_nothing_on_second_poll() {
    let tracker = Arc::new(
        FakeTrackerClient::new().with_issue(issue(1, &["task:implement", "status:pending"])),
    );
    let mut poller = WorkItemPoller::new(tracker, FakeClock::default());
    poller.poll().await;
    let events = poller.poll().await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn status_label_change_emits_changed_event() {
    let tracker = FakeTrackerClient::new().with_issue(issue(1, &["task:implement", "status:pending"]));
    let tracker = Arc::new(tracker);
    let mut poller = WorkItemPoller::new(Arc::clone(&tracker), FakeClock::default());
    poller.poll().await;

    tracker.add_label(1, "status:unblocked").await.unwrap();
    tracker.remove_label(1, "status:pending").await.unwrap();
    let events = poller.poll().await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::WorkItemChanged { old_status, new_status, .. } => {
            assert_eq!(*old_status, Some(WorkItemStatus::Pending));
            assert_eq!(*new_status, Some(WorkItemStatus::Unblocked));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn disappeared_issue_emits_removed_event_and_drops_entry() {
    let tracker = FakeTrackerClient::new().with_issue(issue(1, &["task:implement"]));
    let tracker = Arc::new(tracker);
    let mut poller = WorkItemPoller::new(Arc::clone(&tracker), FakeClock::default());
    poller.poll().await;

    tracker.remove_label(1, "task:implement").await.unwrap();
    let events = poller.poll().await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::WorkItemChanged { new_status, work_item, .. } => {
            assert_eq!(*new_status, None);
            assert!(work_item.is_none());
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(poller.snapshot().get(WorkItemId::new(1)).is_none());
}

#[tokio::test]
async fn complexity_label_maps_to_model_override() {
    let tracker = Arc::new(
        FakeTrackerClient::new()
            .with_issue(issue(1, &["task:implement", "complexity:complex"])),
    );
    let mut poller = WorkItemPoller::new(tracker, FakeClock::default());
    poller.poll().await;
    let item = poller.snapshot().get(WorkItemId::new(1)).unwrap();
    assert_eq!(item.complexity, Some(Complexity::Complex));
    assert_eq!(item.complexity.unwrap().model_override(), "opus");
}

#[tokio::test]
async fn snapshot_mut_presyncs_status_to_avoid_duplicate_event() {
    let tracker = Arc::new(
        FakeTrackerClient::new().with_issue(issue(1, &["task:implement", "status:in-progress"])),
    );
    let mut poller = WorkItemPoller::new(tracker, FakeClock::default());
    poller.poll().await;

    // Simulate completion-dispatch pre-syncing the snapshot to `review`
    // before the tracker itself is updated.
    poller.snapshot_mut().set_status(WorkItemId::new(1), WorkItemStatus::Review);
    assert_eq!(
        poller.snapshot().get(WorkItemId::new(1)).unwrap().status,
        WorkItemStatus::Review
    );
}
