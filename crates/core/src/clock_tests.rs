// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::default();
    let t0 = clock.now();
    clock.advance(chrono::Duration::seconds(30));
    let t1 = clock.now();
    assert_eq!((t1 - t0).num_seconds(), 30);
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::default();
    let target = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn system_clock_moves_forward() {
    let clock = SystemClock;
    let t0 = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let t1 = clock.now();
    assert!(t1 >= t0);
}
