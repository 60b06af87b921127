// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`TrackerClient`] for engine-level tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    CheckRun, CombinedStatusKind, CombinedStatusState, TrackerClient, TrackerError,
    TrackerInlineComment, TrackerIssue, TrackerLabel, TrackerPullRequest, TrackerReview, TreeEntry,
};

#[derive(Debug, Default)]
struct State {
    issues: BTreeMap<u64, TrackerIssue>,
    pull_requests: BTreeMap<u64, TrackerPullRequest>,
    pr_files: BTreeMap<u64, Vec<String>>,
    pr_reviews: BTreeMap<u64, Vec<TrackerReview>>,
    pr_inline_comments: BTreeMap<u64, Vec<TrackerInlineComment>>,
    commit_statuses: BTreeMap<String, CombinedStatusState>,
    check_runs: BTreeMap<String, Vec<CheckRun>>,
    trees: BTreeMap<String, Vec<TreeEntry>>,
    refs: BTreeMap<String, String>,
    file_contents: BTreeMap<(String, String), String>,
    calls: Vec<String>,
}

/// An in-memory tracker. Builder methods (`with_*`) seed state before the
/// fake is handed to the component under test; `calls()` records every
/// mutating operation in order for assertions.
#[derive(Debug, Default, Clone)]
pub struct FakeTrackerClient {
    state: std::sync::Arc<Mutex<State>>,
}

impl FakeTrackerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, issue: TrackerIssue) -> Self {
        self.state.lock().issues.insert(issue.number, issue);
        self
    }

    pub fn with_pull_request(self, pr: TrackerPullRequest) -> Self {
        self.state.lock().pull_requests.insert(pr.number, pr);
        self
    }

    pub fn with_pr_files(self, number: u64, files: Vec<String>) -> Self {
        self.state.lock().pr_files.insert(number, files);
        self
    }

    pub fn with_pr_reviews(self, number: u64, reviews: Vec<TrackerReview>) -> Self {
        self.state.lock().pr_reviews.insert(number, reviews);
        self
    }

    pub fn with_pr_inline_comments(
        self,
        number: u64,
        comments: Vec<TrackerInlineComment>,
    ) -> Self {
        self.state.lock().pr_inline_comments.insert(number, comments);
        self
    }

    pub fn with_commit_status(self, sha: impl Into<String>, status: CombinedStatusState) -> Self {
        self.state.lock().commit_statuses.insert(sha.into(), status);
        self
    }

    pub fn with_check_runs(self, sha: impl Into<String>, runs: Vec<CheckRun>) -> Self {
        self.state.lock().check_runs.insert(sha.into(), runs);
        self
    }

    pub fn with_tree(self, sha: impl Into<String>, entries: Vec<TreeEntry>) -> Self {
        self.state.lock().trees.insert(sha.into(), entries);
        self
    }

    pub fn with_ref(self, branch: impl Into<String>, sha: impl Into<String>) -> Self {
        self.state.lock().refs.insert(branch.into(), sha.into());
        self
    }

    pub fn with_file_content(
        self,
        path: impl Into<String>,
        git_ref: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.state
            .lock()
            .file_contents
            .insert((path.into(), git_ref.into()), content.into());
        self
    }

    /// Set the ref `<branch>` points to for the purposes of `get_ref` (for
    /// tests that dispatch a poll after an engine-driven label mutation).
    pub fn set_ref(&self, branch: impl Into<String>, sha: impl Into<String>) {
        self.state.lock().refs.insert(branch.into(), sha.into());
    }

    /// Replace a pull request's head sha in place, leaving its number and
    /// other fields untouched (for tests that simulate a new push).
    pub fn set_pull_request_head(&self, number: u64, head_sha: impl Into<String>) {
        if let Some(pr) = self.state.lock().pull_requests.get_mut(&number) {
            pr.head_sha = head_sha.into();
        }
    }

    /// Remove a pull request from the fake's open-PR list (for tests that
    /// simulate a revision disappearing between poll cycles).
    pub fn close_pull_request(&self, number: u64) {
        self.state.lock().pull_requests.remove(&number);
    }

    /// Non-builder variant of [`Self::with_commit_status`] for tests that
    /// need to change a sha's status after the fake has already been handed
    /// to the component under test.
    pub fn set_commit_status(&self, sha: impl Into<String>, status: CombinedStatusState) {
        self.state.lock().commit_statuses.insert(sha.into(), status);
    }

    /// Non-builder variant of [`Self::with_check_runs`].
    pub fn set_check_runs(&self, sha: impl Into<String>, runs: Vec<CheckRun>) {
        self.state.lock().check_runs.insert(sha.into(), runs);
    }

    pub fn issue(&self, number: u64) -> Option<TrackerIssue> {
        self.state.lock().issues.get(&number).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl TrackerClient for FakeTrackerClient {
    async fn list_open_issues_by_label(
        &self,
        label: &str,
    ) -> Result<Vec<TrackerIssue>, TrackerError> {
        let state = self.state.lock();
        Ok(state
            .issues
            .values()
            .filter(|issue| issue.state == "open" && issue.has_label(label))
            .cloned()
            .collect())
    }

    async fn get_issue(&self, number: u64) -> Result<TrackerIssue, TrackerError> {
        self.state
            .lock()
            .issues
            .get(&number)
            .cloned()
            .ok_or(TrackerError::NotFound)
    }

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock();
        state.calls.push(format!("add_label({number}, {label})"));
        let issue = state.issues.get_mut(&number).ok_or(TrackerError::NotFound)?;
        if !issue.has_label(label) {
            issue.labels.push(TrackerLabel { name: label.to_string() });
        }
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let mut state = self.state.lock();
        state.calls.push(format!("remove_label({number}, {label})"));
        let issue = state.issues.get_mut(&number).ok_or(TrackerError::NotFound)?;
        issue.labels.retain(|l| l.name != label);
        Ok(())
    }

    async fn list_pull_requests(&self) -> Result<Vec<TrackerPullRequest>, TrackerError> {
        Ok(self.state.lock().pull_requests.values().cloned().collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<TrackerPullRequest, TrackerError> {
        self.state
            .lock()
            .pull_requests
            .get(&number)
            .cloned()
            .ok_or(TrackerError::NotFound)
    }

    async fn list_pr_files(&self, number: u64) -> Result<Vec<String>, TrackerError> {
        Ok(self.state.lock().pr_files.get(&number).cloned().unwrap_or_default())
    }

    async fn list_pr_reviews(&self, number: u64) -> Result<Vec<TrackerReview>, TrackerError> {
        Ok(self
            .state
            .lock()
            .pr_reviews
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_pr_inline_comments(
        &self,
        number: u64,
    ) -> Result<Vec<TrackerInlineComment>, TrackerError> {
        Ok(self
            .state
            .lock()
            .pr_inline_comments
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_combined_commit_status(
        &self,
        sha: &str,
    ) -> Result<CombinedStatusState, TrackerError> {
        Ok(self
            .state
            .lock()
            .commit_statuses
            .get(sha)
            .copied()
            .unwrap_or(CombinedStatusState::new(CombinedStatusKind::Pending, 0)))
    }

    async fn list_check_runs(&self, sha: &str) -> Result<Vec<CheckRun>, TrackerError> {
        Ok(self.state.lock().check_runs.get(sha).cloned().unwrap_or_default())
    }

    async fn get_tree(&self, sha: &str, _recursive: bool) -> Result<Vec<TreeEntry>, TrackerError> {
        Ok(self.state.lock().trees.get(sha).cloned().unwrap_or_default())
    }

    async fn get_ref(&self, branch: &str) -> Result<String, TrackerError> {
        self.state
            .lock()
            .refs
            .get(branch)
            .cloned()
            .ok_or(TrackerError::NotFound)
    }

    async fn get_file_content(
        &self,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>, TrackerError> {
        Ok(self
            .state
            .lock()
            .file_contents
            .get(&(path.to_string(), git_ref.to_string()))
            .cloned())
    }
}
