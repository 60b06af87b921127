// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt construction for the three agent roles (§4.10 "Builds the
//! implementor prompt by enriching issue details with PR files/reviews/CI
//! status"). The teacher has no prompt surface to ground this on directly;
//! the `writeln!`-into-a-`String` buffer idiom is carried over from
//! `activity_logger.rs`'s message formatting.

use std::fmt::Write as _;

use foreman_adapters::TrackerReview;
use foreman_core::{PipelineStatus, WorkItem};

/// The PR-derived context an implementor/reviewer prompt is enriched with
/// when a revision already exists for the work item (§4.10).
#[derive(Debug, Clone)]
pub struct PrContext {
    pub number: u64,
    pub title: String,
    pub head_ref: String,
    pub files: Vec<String>,
    pub reviews: Vec<TrackerReview>,
    pub pipeline_status: Option<PipelineStatus>,
}

/// Builds prompts for the three agent roles. A trait seam so tests (and,
/// eventually, alternate prompt styles) can swap in a stub builder without
/// touching dispatch/command-handler logic.
pub trait PromptBuilder: Send + Sync + 'static {
    fn implementor_prompt(&self, work_item: &WorkItem, pr: Option<&PrContext>) -> String;
    fn reviewer_prompt(&self, work_item: &WorkItem, pr: &PrContext) -> String;
    fn planner_prompt(&self, spec_paths: &[String]) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPromptBuilder;

impl PromptBuilder for DefaultPromptBuilder {
    fn implementor_prompt(&self, work_item: &WorkItem, pr: Option<&PrContext>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Implement issue #{}: {}", work_item.id, work_item.title);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", work_item.body);

        if let Some(pr) = pr {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Existing pull request #{}: {}", pr.number, pr.title);
            let _ = writeln!(out, "Branch: {}", pr.head_ref);
            if !pr.files.is_empty() {
                let _ = writeln!(out, "Changed files:");
                for path in &pr.files {
                    let _ = writeln!(out, "- {path}");
                }
            }
            write_reviews(&mut out, &pr.reviews);
            if let Some(status) = pr.pipeline_status {
                let _ = writeln!(out, "CI status: {status}");
            }
        }

        out
    }

    fn reviewer_prompt(&self, work_item: &WorkItem, pr: &PrContext) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Review pull request #{} for issue #{}: {}", pr.number, work_item.id, work_item.title);
        let _ = writeln!(out, "PR title: {}", pr.title);
        if !pr.files.is_empty() {
            let _ = writeln!(out, "Changed files:");
            for path in &pr.files {
                let _ = writeln!(out, "- {path}");
            }
        }
        write_reviews(&mut out, &pr.reviews);
        out
    }

    fn planner_prompt(&self, spec_paths: &[String]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Plan work from approved specs");
        let _ = writeln!(out);
        for path in spec_paths {
            let _ = writeln!(out, "- {path}");
        }
        out
    }
}

fn write_reviews(out: &mut String, reviews: &[TrackerReview]) {
    if reviews.is_empty() {
        return;
    }
    let _ = writeln!(out, "Reviews:");
    for review in reviews {
        let _ = write!(out, "- {} ({})", review.user_login, review.state);
        if let Some(body) = &review.body {
            let _ = write!(out, ": {body}");
        }
        let _ = writeln!(out);
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
