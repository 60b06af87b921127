// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.10 Command Dispatcher & Handlers: the narrow public command surface
//! (`dispatchImplementor`, `dispatchReviewer`, `cancelAgent`,
//! `cancelPlanner`, `shutdown`) routed to handlers that gate on a work
//! item's current status from the poller snapshot and pre-compute dispatch
//! context (branch strategy, model override, enriched prompt).
//!
//! Grounded on `crates/daemon/src/listener/commands.rs` +
//! `crates/engine/src/runtime/handlers/command.rs` for the
//! pattern-match-on-command-tag-and-route shape; the PR-context enrichment
//! procedures are authored directly from §4.10 (the teacher has no
//! PR-aware dispatch to ground this half on).

use std::sync::Arc;

use foreman_adapters::{AgentSdk, TrackerClient, TrackerPullRequest};
use foreman_core::{links_to, Clock, Command, WorkItemId, WorkItemStatus};

use crate::agent_manager::AgentManager;
use crate::pollers::revision::derive_pipeline_status;
use crate::pollers::work_item::WorkItemSnapshotView;
use crate::prompt::{PrContext, PromptBuilder};

/// Handlers for the five mutating commands (§4.10) plus the read-only
/// `status` query (§1.2 supplement), holding every collaborator a handler
/// needs to pre-compute dispatch context without the caller threading it
/// through per-call.
pub struct CommandHandlers<T: TrackerClient, A: AgentSdk, C: Clock> {
    tracker: Arc<T>,
    agent_manager: AgentManager<A, C>,
    prompts: Arc<dyn PromptBuilder>,
    default_branch: String,
    clock: C,
}

impl<T: TrackerClient, A: AgentSdk, C: Clock> CommandHandlers<T, A, C> {
    pub fn new(
        tracker: Arc<T>,
        agent_manager: AgentManager<A, C>,
        prompts: Arc<dyn PromptBuilder>,
        default_branch: impl Into<String>,
        clock: C,
    ) -> Self {
        Self { tracker, agent_manager, prompts, default_branch: default_branch.into(), clock }
    }

    pub fn agent_manager(&self) -> &AgentManager<A, C> {
        &self.agent_manager
    }

    /// Routes `command` to its handler (§4.10). `snapshot` is the
    /// work-item poller's current read-only view, used to gate
    /// dispatch-implementor/dispatch-reviewer on status.
    pub async fn dispatch(&self, command: Command, snapshot: &WorkItemSnapshotView<'_>) {
        match command {
            Command::DispatchImplementor { work_item_id } => {
                self.dispatch_implementor(work_item_id, snapshot).await;
            }
            Command::DispatchReviewer { work_item_id } => {
                self.dispatch_reviewer(work_item_id, snapshot).await;
            }
            Command::CancelAgent { work_item_id } => {
                self.agent_manager.cancel_agent(work_item_id).await;
            }
            Command::CancelPlanner => {
                self.agent_manager.cancel_planner().await;
            }
            Command::Shutdown | Command::Status => {
                // Handled by the engine root directly (§4.12 "shutdown"
                // triggers the shutdown sequence; `status` is a pure read).
            }
        }
    }

    async fn dispatch_implementor(&self, work_item_id: WorkItemId, snapshot: &WorkItemSnapshotView<'_>) {
        let Some(work_item) = snapshot.get(work_item_id) else {
            tracing::info!(%work_item_id, "dispatch-implementor: unknown work item, skipping");
            return;
        };
        if !work_item.status.implementor_eligible() {
            tracing::info!(%work_item_id, status = %work_item.status, "dispatch-implementor: ineligible status, skipping");
            return;
        }

        let pr = match find_linked_pr(&*self.tracker, work_item_id).await {
            Ok(pr) => pr,
            Err(e) => {
                tracing::warn!(%work_item_id, error = %e, "dispatch-implementor: failed to look up linked PR, skipping");
                return;
            }
        };

        let (branch_name, branch_base) = match &pr {
            Some(pr) => (pr.head_ref.clone(), None),
            None => (
                format!("issue-{}-{}", work_item_id.get(), self.clock.now().timestamp()),
                Some(self.default_branch.clone()),
            ),
        };
        let model_override = work_item.complexity.map(|c| c.model_override().to_string());

        let prompt = match &pr {
            Some(pr) => match build_pr_context(&*self.tracker, pr).await {
                Ok(ctx) => self.prompts.implementor_prompt(work_item, Some(&ctx)),
                Err(e) => {
                    tracing::warn!(%work_item_id, error = %e, "dispatch-implementor: failed to build PR context, skipping");
                    return;
                }
            },
            None => self.prompts.implementor_prompt(work_item, None),
        };

        self.agent_manager.dispatch_implementor(work_item_id, branch_name, branch_base, model_override, prompt);
    }

    async fn dispatch_reviewer(&self, work_item_id: WorkItemId, snapshot: &WorkItemSnapshotView<'_>) {
        let Some(work_item) = snapshot.get(work_item_id) else {
            tracing::info!(%work_item_id, "dispatch-reviewer: unknown work item, skipping");
            return;
        };
        if work_item.status != WorkItemStatus::Review {
            tracing::info!(%work_item_id, status = %work_item.status, "dispatch-reviewer: not in review, skipping");
            return;
        }

        let pr = match find_linked_pr(&*self.tracker, work_item_id).await {
            Ok(Some(pr)) if !pr.draft => pr,
            Ok(_) => {
                tracing::info!(%work_item_id, "dispatch-reviewer: no non-draft PR found, skipping");
                return;
            }
            Err(e) => {
                tracing::warn!(%work_item_id, error = %e, "dispatch-reviewer: failed to look up PR, skipping");
                return;
            }
        };

        let ctx = match build_pr_context(&*self.tracker, &pr).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(%work_item_id, error = %e, "dispatch-reviewer: failed to build PR context, skipping");
                return;
            }
        };

        let prompt = self.prompts.reviewer_prompt(work_item, &ctx);
        self.agent_manager.dispatch_reviewer(work_item_id, pr.head_ref.clone(), true, prompt);
    }
}

/// PR linked to `work_item_id` via a closing-keyword pattern in its body
/// (§3), draft or not — the dispatch-implementor "PR-branch strategy"
/// lookup, also reused by completion-dispatch (§4.12) which needs the
/// non-draft-only variant.
pub async fn find_linked_pr<T: TrackerClient>(
    tracker: &T,
    work_item_id: WorkItemId,
) -> Result<Option<TrackerPullRequest>, foreman_adapters::TrackerError> {
    let prs = tracker.list_pull_requests().await?;
    Ok(prs.into_iter().find(|pr| links_to(pr.body.as_deref().unwrap_or(""), work_item_id.get())))
}

/// Enriches a PR with its changed files, reviews, and derived CI status
/// (§4.10 "PR files/reviews/CI status"), also reused by completion-dispatch
/// (§4.12) when it builds the reviewer prompt.
pub async fn build_pr_context<T: TrackerClient>(
    tracker: &T,
    pr: &TrackerPullRequest,
) -> Result<PrContext, foreman_adapters::TrackerError> {
    let files = tracker.list_pr_files(pr.number).await?;
    let reviews = tracker.list_pr_reviews(pr.number).await?;
    let combined = tracker.get_combined_commit_status(&pr.head_sha).await?;
    let checks = tracker.list_check_runs(&pr.head_sha).await?;
    Ok(PrContext {
        number: pr.number,
        title: pr.title.clone(),
        head_ref: pr.head_ref.clone(),
        files,
        reviews,
        pipeline_status: Some(derive_pipeline_status(combined, &checks)),
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
