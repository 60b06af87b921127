// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn extracts_status_from_frontmatter() {
    let content = "---\nstatus: approved\ntitle: thing\n---\n\n# Body\n";
    assert_eq!(extract_frontmatter_status(content), Some("approved".into()));
}

#[test]
fn returns_none_without_frontmatter() {
    let content = "# Just a heading\n\nstatus: approved\n";
    assert_eq!(extract_frontmatter_status(content), None);
}

#[test]
fn returns_none_when_status_field_missing() {
    let content = "---\ntitle: thing\n---\nbody\n";
    assert_eq!(extract_frontmatter_status(content), None);
}

#[test]
fn ignores_content_outside_the_fence() {
    let a = "---\nstatus: draft\n---\nstatus: approved\n";
    assert_eq!(extract_frontmatter_status(a), Some("draft".into()));
}

#[test]
fn extraction_is_idempotent() {
    let content = "---\nstatus: approved\n---\nbody\n";
    let first = extract_frontmatter_status(content);
    let second = extract_frontmatter_status(content);
    assert_eq!(first, second);
}

#[test]
fn snapshot_serializes_deterministically() {
    let mut snap = SpecSnapshot::default();
    snap.files.insert(
        "b.md".into(),
        SpecSnapshotEntry {
            blob_digest: "d2".into(),
            frontmatter_status: "approved".into(),
        },
    );
    snap.files.insert(
        "a.md".into(),
        SpecSnapshotEntry {
            blob_digest: "d1".into(),
            frontmatter_status: "draft".into(),
        },
    );
    let json = serde_json::to_string(&snap).unwrap();
    let a_pos = json.find("a.md").unwrap();
    let b_pos = json.find("b.md").unwrap();
    assert!(a_pos < b_pos, "BTreeMap keeps keys sorted in serialized output");
}
