// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::work_item::WorkItemId;

#[test]
fn command_names_are_kebab_case() {
    assert_eq!(
        Command::DispatchImplementor { work_item_id: WorkItemId::new(1) }.name(),
        "dispatch-implementor"
    );
    assert_eq!(Command::CancelPlanner.name(), "cancel-planner");
    assert_eq!(Command::Shutdown.name(), "shutdown");
}

#[test]
fn command_round_trips_through_json() {
    let cmd = Command::DispatchReviewer { work_item_id: WorkItemId::new(42) };
    let json = serde_json::to_string(&cmd).unwrap();
    let back: Command = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cmd);
}

#[test]
fn unit_variants_round_trip() {
    for cmd in [Command::CancelPlanner, Command::Shutdown, Command::Status] {
        let json = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
