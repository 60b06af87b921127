// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.3 Working-Copy Manager: isolated repository checkouts rooted at
//! `<repo-root>/.worktrees/<branch>`, built atop [`foreman_adapters::GitVcs`].
//! Grounded in `executor.rs`'s `Effect::DeleteWorkspace` handler for the
//! worktree-remove + directory-removal fallback; the three creation
//! strategies (fresh-branch / existing-branch / fetch-then-attach) have no
//! teacher counterpart and are authored directly from §4.3.

use std::path::{Path, PathBuf};

use foreman_adapters::GitVcs;

use crate::error::WorkingCopyError;

/// Parameters for [`WorkingCopyManager::create`] (§4.3).
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub branch_name: String,
    /// Fresh-branch strategy when set: create `branch_name` off this ref.
    pub branch_base: Option<String>,
    /// Fetch-then-attach strategy when set: fetch `origin/<branch_name>`
    /// before attaching the checkout.
    pub fetch_remote: bool,
}

#[derive(Debug, Clone)]
pub struct WorkingCopy {
    pub branch_name: String,
    pub path: PathBuf,
}

pub struct WorkingCopyManager {
    vcs: GitVcs,
    worktrees_root: PathBuf,
}

impl WorkingCopyManager {
    pub fn new(vcs: GitVcs, worktrees_root: impl Into<PathBuf>) -> Self {
        Self { vcs, worktrees_root: worktrees_root.into() }
    }

    fn path_for(&self, branch_name: &str) -> PathBuf {
        self.worktrees_root.join(branch_name)
    }

    /// Three strategies: fresh-branch, existing-branch (default), or
    /// fetch-then-attach, selected by `params` (§4.3).
    pub async fn create(&self, params: CreateParams) -> Result<WorkingCopy, WorkingCopyError> {
        let path = self.path_for(&params.branch_name);

        if params.fetch_remote {
            self.vcs.fetch(&params.branch_name).await?;
            let remote_ref = format!("origin/{}", params.branch_name);
            self.vcs.worktree_add(&path, &remote_ref, None).await?;
        } else if let Some(base) = &params.branch_base {
            self.vcs.worktree_add(&path, base, Some(&params.branch_name)).await?;
        } else {
            self.vcs
                .worktree_add(&path, &params.branch_name, None)
                .await?;
        }

        Ok(WorkingCopy { branch_name: params.branch_name, path })
    }

    /// `issue-<N>` branch/path. Reuses a registered worktree if one exists;
    /// prunes and re-adds if the branch exists but its worktree directory
    /// was deleted out from under us.
    pub async fn create_or_reuse(&self, issue_number: u64) -> Result<WorkingCopy, WorkingCopyError> {
        let branch_name = format!("issue-{issue_number}");
        let path = self.path_for(&branch_name);

        let existing = self.vcs.worktree_list().await?;
        if let Some(entry) = existing.iter().find(|e| e.branch.as_deref() == Some(branch_name.as_str())) {
            if entry.path.exists() {
                return Ok(WorkingCopy { branch_name, path: entry.path.clone() });
            }
            // Branch exists but the worktree directory is gone: prune the
            // stale registration and re-add.
            self.vcs.worktree_prune().await?;
        }

        if self.vcs.branch_exists(&branch_name).await? {
            self.vcs.worktree_add(&path, &branch_name, None).await?;
        } else {
            self.vcs.worktree_add(&path, "main", Some(&branch_name)).await?;
        }
        Ok(WorkingCopy { branch_name, path })
    }

    /// Best-effort removal; errors are swallowed (§4.3, §7).
    pub async fn remove(&self, issue_number: u64) {
        let branch_name = format!("issue-{issue_number}");
        self.remove_by_path(&self.path_for(&branch_name)).await;
    }

    /// Force removal by path; errors are swallowed (§4.3, §7).
    pub async fn remove_by_path(&self, path: &Path) {
        if let Err(e) = self.vcs.worktree_remove(path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove working copy (non-fatal)");
        }
        if path.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(path).await {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove working copy directory (non-fatal)");
            }
        }
    }
}

#[cfg(test)]
#[path = "working_copy_tests.rs"]
mod tests;
