// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `git` CLI wrapper for worktree management (§6 "VCS CLI").
//!
//! One invocation per call via `tokio::process::Command`; non-zero exit
//! status and stderr surface as [`VcsError::CommandFailed`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT};

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("{0}")]
    SpawnFailed(String),
}

/// One entry from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    pub branch: Option<String>,
}

/// Shells out to `git` on `PATH`, rooted at `repo_root`.
#[derive(Debug, Clone)]
pub struct GitVcs {
    repo_root: PathBuf,
}

fn git_command(repo_root: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(repo_root);
    cmd.args(args);
    cmd
}

async fn run(repo_root: &Path, args: &[&str]) -> Result<String, VcsError> {
    let command_desc = format!("git {}", args.join(" "));
    let output = run_with_timeout(git_command(repo_root, args), GIT_TIMEOUT, &command_desc)
        .await
        .map_err(VcsError::SpawnFailed)?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: command_desc,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

impl GitVcs {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into() }
    }

    pub async fn worktree_list(&self) -> Result<Vec<WorktreeEntry>, VcsError> {
        let stdout = run(
            &self.repo_root,
            &["worktree", "list", "--porcelain"],
        )
        .await?;
        Ok(parse_worktree_list(&stdout))
    }

    /// `worktree add [-b <branch>] <path> <ref>`. Pass `new_branch = None`
    /// to attach an existing branch (the existing-branch strategy); `Some`
    /// to create `new_branch` off `start_ref` (the fresh-branch strategy).
    pub async fn worktree_add(
        &self,
        path: &Path,
        start_ref: &str,
        new_branch: Option<&str>,
    ) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        let mut args: Vec<&str> = vec!["worktree", "add"];
        if let Some(branch) = new_branch {
            args.push("-b");
            args.push(branch);
        }
        args.push(&path_str);
        args.push(start_ref);
        run(&self.repo_root, &args).await?;
        Ok(())
    }

    pub async fn worktree_remove(&self, path: &Path) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        run(&self.repo_root, &["worktree", "remove", &path_str, "--force"]).await?;
        Ok(())
    }

    pub async fn worktree_prune(&self) -> Result<(), VcsError> {
        run(&self.repo_root, &["worktree", "prune"]).await?;
        Ok(())
    }

    /// `None` if the branch does not exist locally.
    pub async fn branch_exists(&self, branch: &str) -> Result<bool, VcsError> {
        let refspec = format!("refs/heads/{branch}");
        match run(&self.repo_root, &["rev-parse", "--verify", &refspec]).await {
            Ok(_) => Ok(true),
            Err(VcsError::CommandFailed { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    pub async fn show_toplevel(&self) -> Result<PathBuf, VcsError> {
        let stdout = run(&self.repo_root, &["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(stdout))
    }

    pub async fn fetch(&self, branch: &str) -> Result<(), VcsError> {
        run(&self.repo_root, &["fetch", "origin", branch]).await?;
        Ok(())
    }

    /// Paths changed between `base` and `head`, restricted to `path_scope`.
    pub async fn diff_paths(
        &self,
        base: &str,
        head: &str,
        path_scope: &str,
    ) -> Result<Vec<String>, VcsError> {
        let range = format!("{base}..{head}");
        let stdout = run(
            &self.repo_root,
            &["diff", "--name-only", &range, "--", path_scope],
        )
        .await?;
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

fn parse_worktree_list(stdout: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut branch: Option<String> = None;

    for line in stdout.lines() {
        if let Some(p) = line.strip_prefix("worktree ") {
            if let Some(prev) = path.take() {
                entries.push(WorktreeEntry { path: prev, branch: branch.take() });
            }
            path = Some(PathBuf::from(p));
        } else if let Some(b) = line.strip_prefix("branch ") {
            branch = b.strip_prefix("refs/heads/").map(String::from).or(Some(b.to_string()));
        } else if line.is_empty() {
            if let Some(prev) = path.take() {
                entries.push(WorktreeEntry { path: prev, branch: branch.take() });
            }
        }
    }
    if let Some(prev) = path.take() {
        entries.push(WorktreeEntry { path: prev, branch: branch.take() });
    }
    entries
}

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
