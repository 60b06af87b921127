// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .expect("git must be on PATH for vcs tests");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q", "-b", "main"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "user.name", "test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    git(dir.path(), &["add", "."]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn worktree_add_fresh_branch_then_list_then_remove() {
    let repo = init_repo();
    let vcs = GitVcs::new(repo.path());
    let worktree_path = repo.path().join(".worktrees").join("issue-1");

    vcs.worktree_add(&worktree_path, "main", Some("issue-1"))
        .await
        .unwrap();

    let entries = vcs.worktree_list().await.unwrap();
    assert!(entries.iter().any(|e| e.branch.as_deref() == Some("issue-1")));

    vcs.worktree_remove(&worktree_path).await.unwrap();
    let entries = vcs.worktree_list().await.unwrap();
    assert!(!entries.iter().any(|e| e.branch.as_deref() == Some("issue-1")));
}

#[tokio::test]
async fn branch_exists_reflects_local_branches() {
    let repo = init_repo();
    let vcs = GitVcs::new(repo.path());
    assert!(vcs.branch_exists("main").await.unwrap());
    assert!(!vcs.branch_exists("does-not-exist").await.unwrap());
}

#[tokio::test]
async fn show_toplevel_resolves_repo_root() {
    let repo = init_repo();
    let vcs = GitVcs::new(repo.path());
    let toplevel = vcs.show_toplevel().await.unwrap();
    assert_eq!(
        toplevel.canonicalize().unwrap(),
        repo.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn diff_paths_reports_changed_files_in_scope() {
    let repo = init_repo();
    std::fs::create_dir_all(repo.path().join("docs/specs")).unwrap();
    std::fs::write(repo.path().join("docs/specs/a.md"), "status: approved\n").unwrap();
    std::fs::write(repo.path().join("unrelated.txt"), "noise\n").unwrap();
    git(repo.path(), &["add", "."]);
    git(repo.path(), &["commit", "-q", "-m", "add spec"]);

    let vcs = GitVcs::new(repo.path());
    let head = run(repo.path(), &["rev-parse", "HEAD"]).await.unwrap();
    let parent = format!("{head}~1");
    let changed = vcs.diff_paths(&parent, &head, "docs/specs/").await.unwrap();
    assert_eq!(changed, vec!["docs/specs/a.md".to_string()]);
}

#[test]
fn parse_worktree_list_handles_multiple_entries() {
    let stdout = "worktree /repo\nHEAD abc123\nbranch refs/heads/main\n\nworktree /repo/.worktrees/issue-1\nHEAD def456\nbranch refs/heads/issue-1\n";
    let entries = parse_worktree_list(stdout);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].branch.as_deref(), Some("main"));
    assert_eq!(entries[1].branch.as_deref(), Some("issue-1"));
}
