// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    requested = {SessionStatus::Requested, true, false},
    running = {SessionStatus::Running, true, false},
    completed = {SessionStatus::Completed, false, true},
    failed = {SessionStatus::Failed, false, true},
    cancelled = {SessionStatus::Cancelled, false, true},
)]
fn status_active_and_terminal_are_exclusive(status: SessionStatus, active: bool, terminal: bool) {
    assert_eq!(status.is_active(), active);
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn role_display_matches_role_string() {
    assert_eq!(AgentRole::Planner.to_string(), "planner");
    assert_eq!(AgentRole::Implementor.to_string(), "implementor");
    assert_eq!(AgentRole::Reviewer.to_string(), "reviewer");
}

#[test]
fn session_id_default_is_empty() {
    assert_eq!(SessionId::default().as_str(), "");
}
