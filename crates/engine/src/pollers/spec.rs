// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.6 Spec Poller: two-level digest comparison so a quiet spec directory
//! costs one tree fetch, never a per-file fetch.

use std::sync::Arc;

use foreman_adapters::{TrackerClient, TreeEntry};
use foreman_core::{
    extract_frontmatter_status, SpecChange, SpecChangeKind, SpecPollerBatchResult, SpecSnapshot,
    SpecSnapshotEntry,
};

pub struct SpecPoller<T: TrackerClient> {
    tracker: Arc<T>,
    specs_dir: String,
    default_branch: String,
    snapshot: SpecSnapshot,
}

impl<T: TrackerClient> SpecPoller<T> {
    pub fn new(tracker: Arc<T>, specs_dir: impl Into<String>, default_branch: impl Into<String>) -> Self {
        Self {
            tracker,
            specs_dir: normalize_dir(specs_dir.into()),
            default_branch: default_branch.into(),
            snapshot: SpecSnapshot::default(),
        }
    }

    /// Rebuild with a snapshot loaded from the planner cache (§4.12 step 1).
    pub fn with_snapshot(mut self, snapshot: SpecSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn snapshot(&self) -> &SpecSnapshot {
        &self.snapshot
    }

    /// §4.6 steps 1-7.
    pub async fn poll(&mut self) -> SpecPollerBatchResult {
        let head = match self.tracker.get_ref(&self.default_branch).await {
            Ok(sha) => sha,
            Err(e) => {
                tracing::warn!(error = %e, "spec poll failed to resolve default branch ref, skipping cycle");
                return SpecPollerBatchResult::default();
            }
        };

        let tree = match self.tracker.get_tree(&head, true).await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(error = %e, "spec poll failed to fetch tree, skipping cycle");
                return SpecPollerBatchResult::default();
            }
        };

        let dir_entry = tree.iter().find(|e| e.path == self.specs_dir.trim_end_matches('/'));
        let directory_digest = dir_entry.map(|e| e.sha.clone());

        if directory_digest == self.snapshot.tree_digest {
            return SpecPollerBatchResult::default();
        }

        let blobs: Vec<&TreeEntry> = tree
            .iter()
            .filter(|e| e.kind == "blob" && e.path.starts_with(&self.specs_dir))
            .collect();

        let mut changes = Vec::new();
        for entry in &blobs {
            let kind = match self.snapshot.files.get(&entry.path) {
                None => SpecChangeKind::Added,
                Some(existing) if existing.blob_digest != entry.sha => SpecChangeKind::Modified,
                Some(_) => continue,
            };

            let content = match self.tracker.get_file_content(&entry.path, &head).await {
                Ok(Some(content)) => content,
                Ok(None) => {
                    tracing::debug!(path = %entry.path, "spec file content missing at head, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(path = %entry.path, error = %e, "failed to fetch spec content, retry next cycle");
                    continue;
                }
            };

            let Some(status) = extract_frontmatter_status(&content) else {
                tracing::debug!(path = %entry.path, "spec file has no parseable frontmatter status, dropping");
                continue;
            };

            self.snapshot.files.insert(
                entry.path.clone(),
                SpecSnapshotEntry { blob_digest: entry.sha.clone(), frontmatter_status: status.clone() },
            );
            changes.push(SpecChange {
                path: entry.path.clone(),
                blob_digest: entry.sha.clone(),
                frontmatter_status: status,
                kind,
            });
        }

        // Drop snapshot entries whose path vanished from the tree entirely
        // (§4.6 step 4: "a missing path -> silently drop").
        let present: std::collections::HashSet<&str> =
            blobs.iter().map(|e| e.path.as_str()).collect();
        self.snapshot.files.retain(|path, _| present.contains(path.as_str()));

        self.snapshot.tree_digest = directory_digest;

        let commit_digest = if changes.is_empty() { String::new() } else { head };

        SpecPollerBatchResult { changes, commit_digest }
    }
}

fn normalize_dir(mut dir: String) -> String {
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
