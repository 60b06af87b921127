// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn acquires_and_records_the_pid() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("daemon.pid");
    let _lock = acquire_pid_lock(dir.path(), &lock_path).unwrap();
    assert_eq!(read_lock_pid(&lock_path), Some(std::process::id().to_string()));
}

#[test]
fn a_second_lock_attempt_fails_while_the_first_is_held() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("daemon.pid");
    let _first = acquire_pid_lock(dir.path(), &lock_path).unwrap();

    let err = acquire_pid_lock(dir.path(), &lock_path).unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyRunning));
}

#[test]
fn lock_is_released_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("daemon.pid");
    {
        let _lock = acquire_pid_lock(dir.path(), &lock_path).unwrap();
    }
    let _reacquired = acquire_pid_lock(dir.path(), &lock_path).unwrap();
}

#[test]
fn leaves_a_small_log_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("daemon.log");
    std::fs::write(&log_path, b"small").unwrap();
    rotate_log_if_needed(&log_path);
    assert_eq!(std::fs::read(&log_path).unwrap(), b"small");
}

#[test]
fn rotates_a_log_past_the_size_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("daemon.log");
    std::fs::write(&log_path, vec![b'x'; (MAX_LOG_SIZE + 1) as usize]).unwrap();
    rotate_log_if_needed(&log_path);
    assert!(!log_path.exists());
    assert!(dir.path().join("daemon.log.1").exists());
}

#[test]
fn missing_log_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    rotate_log_if_needed(&dir.path().join("missing.log"));
}
