// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn stop_is_a_no_op_when_no_lock_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    stop_daemon_sync(&dir.path().join("daemon.pid"));
}

#[test]
fn stop_is_a_no_op_for_a_stale_pid_that_no_longer_exists() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("daemon.pid");
    // PID 1 belongs to init and is never the daemon under test; using an
    // implausibly large PID keeps the probe a guaranteed miss in CI
    // sandboxes without assuming anything about PID 1's reachability.
    std::fs::write(&lock_path, "999999").unwrap();
    stop_daemon_sync(&lock_path);
}

#[test]
fn find_foremand_binary_falls_back_to_path_lookup() {
    // Without a sibling `foremand` next to the test binary, resolution
    // falls back to a bare command name resolved via PATH at spawn time.
    let path = find_foremand_binary();
    assert_eq!(path, PathBuf::from("foremand"));
}
