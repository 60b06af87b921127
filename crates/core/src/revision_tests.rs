// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    closes = {"This closes #42 neatly"},
    closed = {"Closed #42."},
    fixes = {"fixes #42"},
    fixed = {"Fixed #42 today"},
    resolves = {"Resolves #42"},
    resolved = {"resolved #42"},
    uppercase = {"CLOSES #42"},
    colon = {"closes: #42"},
)]
fn recognizes_closing_keyword_variants(body: &str) {
    assert!(links_to(body, 42));
}

#[test]
fn does_not_link_unrelated_issue_number() {
    assert!(!links_to("closes #43", 42));
}

#[test]
fn does_not_link_plain_mention() {
    assert!(!links_to("see #42 for context", 42));
}

#[test]
fn links_one_of_several_references() {
    assert!(links_to("part of #1, closes #42, see also #7", 42));
}

#[test]
fn revision_id_displays_as_number() {
    assert_eq!(RevisionId::new(7).to_string(), "7");
}
