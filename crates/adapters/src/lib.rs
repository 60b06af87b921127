// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the agent SDK, the hosted-tracker HTTP
//! client, and the `git`-backed working-copy helper (§6).

pub mod agent;
pub mod subprocess;
pub mod tracker;
pub mod vcs;

pub use agent::{
    AgentMessage, AgentSdk, AgentSdkError, ClaudeAgentSdk, ContentBlock, QueryHandle, QueryParams,
};
pub use tracker::{
    CheckRun, CombinedStatusKind, CombinedStatusState, GitHubTrackerClient, TrackerClient,
    TrackerError, TrackerInlineComment, TrackerIssue, TrackerLabel, TrackerPullRequest,
    TrackerReview, TreeEntry,
};
pub use vcs::{GitVcs, VcsError, WorktreeEntry};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::{FakeAgentSdk, ScriptedTurn};
#[cfg(any(test, feature = "test-support"))]
pub use tracker::FakeTrackerClient;
