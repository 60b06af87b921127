// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-tracker client seam (§6 "External-tracker client").
//!
//! The core depends only on [`TrackerClient`]. [`github::GitHubTrackerClient`]
//! speaks to a GitHub-shaped REST API via `reqwest`, authenticating with a
//! GitHub App installation-token flow; [`fake::FakeTrackerClient`] backs
//! engine-level tests.

pub mod github;

pub use github::GitHubTrackerClient;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTrackerClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Request(String),
    #[error("tracker returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("tracker authentication failed: {0}")]
    Auth(String),
    #[error("not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerLabel {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<TrackerLabel>,
    pub html_url: String,
}

impl TrackerIssue {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerPullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    pub head_sha: String,
    pub head_ref: String,
    pub user_login: String,
    pub draft: bool,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerReview {
    pub user_login: String,
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerInlineComment {
    pub path: String,
    pub body: String,
    #[serde(default)]
    pub line: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinedStatusKind {
    Pending,
    Success,
    Failure,
}

/// Combined commit status plus the legacy-status count §4.7's derivation
/// table gates on (a combined state of `pending`/`success` with zero
/// statuses means "no legacy status configured", not "pending"/"passing").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatusState {
    pub state: CombinedStatusKind,
    pub total_count: u32,
}

impl CombinedStatusState {
    pub fn new(state: CombinedStatusKind, total_count: u32) -> Self {
        Self { state, total_count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// `"tree"` for a directory, `"blob"` for a file.
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

/// The external-tracker seam (§6). One client is constructed per
/// `{owner, repo}` and reused across the lifetime of the engine.
#[async_trait]
pub trait TrackerClient: Send + Sync + 'static {
    async fn list_open_issues_by_label(
        &self,
        label: &str,
    ) -> Result<Vec<TrackerIssue>, TrackerError>;

    async fn get_issue(&self, number: u64) -> Result<TrackerIssue, TrackerError>;

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError>;

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError>;

    async fn list_pull_requests(&self) -> Result<Vec<TrackerPullRequest>, TrackerError>;

    async fn get_pull_request(&self, number: u64) -> Result<TrackerPullRequest, TrackerError>;

    async fn list_pr_files(&self, number: u64) -> Result<Vec<String>, TrackerError>;

    async fn list_pr_reviews(&self, number: u64) -> Result<Vec<TrackerReview>, TrackerError>;

    async fn list_pr_inline_comments(
        &self,
        number: u64,
    ) -> Result<Vec<TrackerInlineComment>, TrackerError>;

    async fn get_combined_commit_status(
        &self,
        sha: &str,
    ) -> Result<CombinedStatusState, TrackerError>;

    async fn list_check_runs(&self, sha: &str) -> Result<Vec<CheckRun>, TrackerError>;

    /// Fetch the recursive tree rooted at `sha`.
    async fn get_tree(&self, sha: &str, recursive: bool) -> Result<Vec<TreeEntry>, TrackerError>;

    /// Resolve `refs/heads/<branch>` to a commit digest.
    async fn get_ref(&self, branch: &str) -> Result<String, TrackerError>;

    /// Fetch the decoded content of `path` at `git_ref`. `None` if the path
    /// does not exist at that ref.
    async fn get_file_content(
        &self,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>, TrackerError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
