// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Revision data model: a pull request (or equivalent proposed-change
//! artifact) on the hosted source-control service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Numeric identity of a revision (PR number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionId(pub u64);

impl RevisionId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CI/pipeline status derived from combined commit status + check runs (§4.7).
/// `null` in the spec's data model is represented as `Option::None` at call
/// sites; this enum only ever carries a concrete observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Success,
    Failure,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

/// `{id, title, url, headDigest, headRef, author, body, pipelineStatus, isDraft}` per §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub title: String,
    pub url: String,
    pub head_digest: String,
    pub head_ref: String,
    pub author: String,
    pub body: String,
    pub pipeline_status: Option<PipelineStatus>,
    pub is_draft: bool,
}

#[allow(clippy::expect_used)]
static CLOSING_KEYWORD_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\b(?:close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s*:?\s*#(\d+)")
        .expect("closing-keyword regex is valid")
});

/// Does `body` link this revision to `work_item_id` via a closing-keyword
/// pattern (`closes #N`, `fixes #N`, `resolves #N`, case-insensitive)?
pub fn links_to(body: &str, work_item_id: u64) -> bool {
    CLOSING_KEYWORD_RE.captures_iter(body).any(|cap| {
        cap.get(1)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .is_some_and(|n| n == work_item_id)
    })
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod tests;
