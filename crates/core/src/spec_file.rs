// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec file / spec snapshot data model (§3, §4.6).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One file under the configured spec directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFile {
    pub path: String,
    pub blob_digest: String,
    pub frontmatter_status: Option<String>,
}

/// A single file's tracked state inside the [`SpecSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSnapshotEntry {
    pub blob_digest: String,
    pub frontmatter_status: String,
}

/// `{treeDigest | null, files: path -> (blobDigest, frontmatterStatus)}` (§3).
///
/// `BTreeMap` keeps serialization deterministic, which matters for the
/// planner cache's round-trip law (§8).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSnapshot {
    pub tree_digest: Option<String>,
    pub files: BTreeMap<String, SpecSnapshotEntry>,
}

/// The kind of change the spec poller observed for one path (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecChangeKind {
    Added,
    Modified,
}

/// One parsed, dispatch-eligible change emitted by a spec poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChange {
    pub path: String,
    pub blob_digest: String,
    pub frontmatter_status: String,
    pub kind: SpecChangeKind,
}

/// Result of one spec-poller cycle (§4.6 step 6): the batch of changes plus
/// the head commit digest, which may be empty when no changes were detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPollerBatchResult {
    pub changes: Vec<SpecChange>,
    pub commit_digest: String,
}

/// Extract the leading `---...---` YAML frontmatter block's `status:` field.
///
/// Returns `None` if there is no frontmatter block or it carries no `status`
/// field; per §4.6 step 5 an unparseable file does not participate in
/// dispatch.
pub fn extract_frontmatter_status(content: &str) -> Option<String> {
    let rest = content.strip_prefix("---\n").or_else(|| {
        // Tolerate a leading BOM/CRLF before the opening fence.
        content.trim_start_matches('\u{feff}').strip_prefix("---\n")
    })?;
    let end = rest.find("\n---")?;
    let yaml = &rest[..end];

    #[derive(Deserialize)]
    struct Frontmatter {
        status: Option<String>,
    }

    let parsed: Frontmatter = serde_yaml::from_str(yaml).ok()?;
    parsed.status
}

#[cfg(test)]
#[path = "spec_file_tests.rs"]
mod tests;
