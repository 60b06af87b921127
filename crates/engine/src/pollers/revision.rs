// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.7 Revision Poller: tracks open revisions (pull requests), detects CI
//! transitions, and detects new/removed revisions.
//!
//! As with the work-item poller, the teacher has no tracker-poller
//! counterpart; the pipeline-status derivation table is authored directly
//! from §4.7.

use std::collections::HashMap;
use std::sync::Arc;

use foreman_adapters::{CombinedStatusKind, CombinedStatusState, TrackerClient, TrackerPullRequest};
use foreman_core::{Event, PipelineStatus, Revision, RevisionId};

fn revision_from_pr(pr: &TrackerPullRequest, pipeline_status: Option<PipelineStatus>) -> Revision {
    Revision {
        id: RevisionId::new(pr.number),
        title: pr.title.clone(),
        url: pr.html_url.clone(),
        head_digest: pr.head_sha.clone(),
        head_ref: pr.head_ref.clone(),
        author: pr.user_login.clone(),
        body: pr.body.clone().unwrap_or_default(),
        pipeline_status,
        is_draft: pr.draft,
    }
}

/// §4.7 pipeline-status derivation table. Exposed to `commands` so the
/// implementor/reviewer prompt builders (§4.10) can derive the same status
/// for PR-context enrichment without re-polling the revision poller.
///
/// `combined.total_count` disambiguates a combined state of `pending` with
/// no legacy statuses configured (common on check-runs-only PRs) from one
/// with statuses genuinely in flight — both surface as `state: "pending"`
/// from the tracker, but only the latter should hold up a `success` verdict.
pub(crate) fn derive_pipeline_status(
    combined: CombinedStatusState,
    checks: &[foreman_adapters::CheckRun],
) -> PipelineStatus {
    let any_check_failed = checks.iter().any(|c| {
        matches!(c.conclusion.as_deref(), Some("failure") | Some("cancelled") | Some("timed_out"))
    });
    if matches!(combined.state, CombinedStatusKind::Failure) || any_check_failed {
        return PipelineStatus::Failure;
    }

    let any_check_incomplete = checks.iter().any(|c| c.conclusion.is_none());
    let combined_pending_with_statuses =
        matches!(combined.state, CombinedStatusKind::Pending) && combined.total_count > 0;
    let both_sources_empty = combined.total_count == 0 && checks.is_empty();
    if any_check_incomplete || combined_pending_with_statuses || both_sources_empty {
        return PipelineStatus::Pending;
    }

    let combined_ok = matches!(combined.state, CombinedStatusKind::Success) || combined.total_count == 0;
    let all_checks_succeeded = checks.iter().all(|c| c.conclusion.as_deref() == Some("success"));
    if combined_ok && all_checks_succeeded {
        return PipelineStatus::Success;
    }

    PipelineStatus::Pending
}

pub struct RevisionPoller<T: TrackerClient> {
    tracker: Arc<T>,
    snapshot: HashMap<RevisionId, Revision>,
}

impl<T: TrackerClient> RevisionPoller<T> {
    pub fn new(tracker: Arc<T>) -> Self {
        Self { tracker, snapshot: HashMap::new() }
    }

    pub fn snapshot(&self) -> &HashMap<RevisionId, Revision> {
        &self.snapshot
    }

    /// §4.7 `poll()`. On a tracker error the cycle is skipped.
    pub async fn poll(&mut self) -> Vec<Event> {
        let prs = match self.tracker.list_pull_requests().await {
            Ok(prs) => prs,
            Err(e) => {
                tracing::warn!(error = %e, "revision poll failed, skipping cycle");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for pr in &prs {
            let id = RevisionId::new(pr.number);
            seen.insert(id);

            match self.snapshot.get(&id) {
                None => {
                    let pipeline_status = self.resolve_pipeline_status(&pr.head_sha, None).await;
                    self.snapshot.insert(id, revision_from_pr(pr, pipeline_status));
                    events.push(Event::RevisionDetected { revision_id: id });
                    if pipeline_status.is_some() {
                        events.push(Event::RevisionStatusChanged {
                            revision_id: id,
                            old_status: None,
                            new_status: pipeline_status,
                        });
                    }
                }
                Some(prev) => {
                    let head_changed = prev.head_digest != pr.head_sha;
                    let needs_recheck = head_changed || prev.pipeline_status != Some(PipelineStatus::Success);
                    let old_status = prev.pipeline_status;

                    let new_status = if needs_recheck {
                        self.resolve_pipeline_status(&pr.head_sha, old_status).await
                    } else {
                        old_status
                    };

                    let updated = revision_from_pr(pr, new_status);
                    if new_status != old_status {
                        events.push(Event::RevisionStatusChanged {
                            revision_id: id,
                            old_status,
                            new_status,
                        });
                    }
                    self.snapshot.insert(id, updated);
                }
            }
        }

        let removed: Vec<RevisionId> =
            self.snapshot.keys().filter(|id| !seen.contains(id)).copied().collect();
        for id in removed {
            self.snapshot.remove(&id);
            events.push(Event::RevisionRemoved { revision_id: id });
        }

        events
    }

    /// Re-derives pipeline status by fetching combined commit status and
    /// check runs for `head_sha`. The §4.7 "skip when head digest unchanged
    /// and stored status is already `success`" optimization is the caller's
    /// `needs_recheck` guard — by the time this is called a recheck is
    /// always warranted, so it must not short-circuit on `stored` itself
    /// (a changed head with a previously-green status must still be
    /// fetched, not reported green on the strength of its predecessor).
    async fn resolve_pipeline_status(
        &self,
        head_sha: &str,
        stored: Option<PipelineStatus>,
    ) -> Option<PipelineStatus> {
        let combined = match self.tracker.get_combined_commit_status(head_sha).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(head_sha, error = %e, "failed to fetch combined commit status");
                return stored;
            }
        };
        let checks = match self.tracker.list_check_runs(head_sha).await {
            Ok(checks) => checks,
            Err(e) => {
                tracing::warn!(head_sha, error = %e, "failed to fetch check runs");
                return stored;
            }
        };

        Some(derive_pipeline_status(combined, &checks))
    }
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod tests;
