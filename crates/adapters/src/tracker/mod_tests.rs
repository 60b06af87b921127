// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::tracker::fake::FakeTrackerClient;

fn issue(number: u64, state: &str, labels: &[&str]) -> TrackerIssue {
    TrackerIssue {
        number,
        title: format!("issue {number}"),
        body: None,
        state: state.to_string(),
        labels: labels
            .iter()
            .map(|l| TrackerLabel { name: (*l).to_string() })
            .collect(),
        html_url: format!("https://example.test/issues/{number}"),
    }
}

#[test]
fn issue_has_label_checks_by_name() {
    let i = issue(1, "open", &["task:implement", "status:pending"]);
    assert!(i.has_label("task:implement"));
    assert!(!i.has_label("status:review"));
}

#[tokio::test]
async fn list_open_issues_by_label_filters_on_state_and_label() {
    let tracker = FakeTrackerClient::new()
        .with_issue(issue(1, "open", &["task:implement"]))
        .with_issue(issue(2, "closed", &["task:implement"]))
        .with_issue(issue(3, "open", &["other"]));

    let found = tracker.list_open_issues_by_label("task:implement").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].number, 1);
}

#[tokio::test]
async fn add_label_is_idempotent() {
    let tracker = FakeTrackerClient::new().with_issue(issue(1, "open", &[]));
    tracker.add_label(1, "status:pending").await.unwrap();
    tracker.add_label(1, "status:pending").await.unwrap();
    let fetched = tracker.get_issue(1).await.unwrap();
    assert_eq!(fetched.labels.len(), 1);
}

#[tokio::test]
async fn remove_label_missing_issue_is_not_found() {
    let tracker = FakeTrackerClient::new();
    let err = tracker.remove_label(99, "status:pending").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound));
}

#[tokio::test]
async fn get_file_content_missing_path_returns_none() {
    let tracker = FakeTrackerClient::new().with_file_content("docs/specs/a.md", "main", "hi");
    assert_eq!(
        tracker.get_file_content("docs/specs/a.md", "main").await.unwrap(),
        Some("hi".to_string())
    );
    assert_eq!(
        tracker.get_file_content("docs/specs/b.md", "main").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn get_ref_resolves_branch_to_sha() {
    let tracker = FakeTrackerClient::new().with_ref("main", "deadbeef");
    assert_eq!(tracker.get_ref("main").await.unwrap(), "deadbeef");
    assert!(matches!(
        tracker.get_ref("other").await.unwrap_err(),
        TrackerError::NotFound
    ));
}
