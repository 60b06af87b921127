// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::work_item::{WorkItemId, WorkItemStatus};
use std::sync::Mutex as StdMutex;

fn sample_event() -> Event {
    Event::WorkItemChanged {
        work_item_id: WorkItemId::new(1),
        old_status: None,
        new_status: Some(WorkItemStatus::Pending),
        work_item: None,
        is_recovery: false,
        is_engine_transition: false,
    }
}

#[test]
fn delivers_to_all_subscribers_in_order() {
    let emitter = EventEmitter::new();
    let order = Arc::new(StdMutex::new(Vec::new()));

    let o1 = Arc::clone(&order);
    emitter.subscribe(move |_| o1.lock().unwrap().push(1));
    let o2 = Arc::clone(&order);
    emitter.subscribe(move |_| o2.lock().unwrap().push(2));

    emitter.emit(&sample_event());

    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn unsubscribe_stops_future_delivery() {
    let emitter = EventEmitter::new();
    let count = Arc::new(StdMutex::new(0));
    let c = Arc::clone(&count);
    let handle = emitter.subscribe(move |_| *c.lock().unwrap() += 1);

    emitter.emit(&sample_event());
    handle.cancel();
    emitter.emit(&sample_event());

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn subscriber_panic_does_not_block_later_subscribers() {
    let emitter = EventEmitter::new();
    emitter.subscribe(|_| panic!("boom"));
    let ran = Arc::new(StdMutex::new(false));
    let r = Arc::clone(&ran);
    emitter.subscribe(move |_| *r.lock().unwrap() = true);

    emitter.emit(&sample_event());

    assert!(*ran.lock().unwrap());
}

#[test]
fn subscriber_count_reflects_active_subscriptions() {
    let emitter = EventEmitter::new();
    assert_eq!(emitter.subscriber_count(), 0);
    let h = emitter.subscribe(|_| {});
    assert_eq!(emitter.subscriber_count(), 1);
    h.cancel();
    assert_eq!(emitter.subscriber_count(), 0);
}

#[test]
fn no_subscribers_is_a_no_op() {
    let emitter = EventEmitter::new();
    emitter.emit(&sample_event());
}
