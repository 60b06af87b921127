// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_core::{WorkItemId, WorkItemStatus};

fn work_item() -> WorkItem {
    WorkItem {
        id: WorkItemId::new(42),
        title: "Add retry logic".to_string(),
        body: "Retries should back off exponentially.".to_string(),
        status: WorkItemStatus::InProgress,
        priority: None,
        complexity: None,
        blocked_by: Vec::new(),
        created_at: chrono::Utc::now(),
    }
}

fn pr() -> PrContext {
    PrContext {
        number: 7,
        title: "Add retry logic".to_string(),
        head_ref: "issue-42-branch".to_string(),
        files: vec!["src/retry.rs".to_string()],
        reviews: vec![TrackerReview {
            user_login: "reviewer1".to_string(),
            state: "CHANGES_REQUESTED".to_string(),
            body: Some("please add a test".to_string()),
        }],
        pipeline_status: Some(PipelineStatus::Failure),
    }
}

#[test]
fn implementor_prompt_without_pr_contains_issue_body_only() {
    let prompt = DefaultPromptBuilder.implementor_prompt(&work_item(), None);
    assert!(prompt.contains("#42"));
    assert!(prompt.contains("Retries should back off exponentially."));
    assert!(!prompt.contains("pull request"));
}

#[test]
fn implementor_prompt_with_pr_enriches_with_files_reviews_and_ci() {
    let prompt = DefaultPromptBuilder.implementor_prompt(&work_item(), Some(&pr()));
    assert!(prompt.contains("pull request #7"));
    assert!(prompt.contains("src/retry.rs"));
    assert!(prompt.contains("reviewer1"));
    assert!(prompt.contains("please add a test"));
    assert!(prompt.contains("CI status: failure"));
}

#[test]
fn reviewer_prompt_mentions_pr_and_issue_number() {
    let prompt = DefaultPromptBuilder.reviewer_prompt(&work_item(), &pr());
    assert!(prompt.contains("#7"));
    assert!(prompt.contains("#42"));
    assert!(prompt.contains("src/retry.rs"));
}

#[test]
fn planner_prompt_lists_every_spec_path() {
    let prompt = DefaultPromptBuilder.planner_prompt(&["docs/specs/a.md".to_string(), "docs/specs/b.md".to_string()]);
    assert!(prompt.contains("docs/specs/a.md"));
    assert!(prompt.contains("docs/specs/b.md"));
}
