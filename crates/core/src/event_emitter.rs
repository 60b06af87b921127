// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.1 Event Emitter: synchronous fan-out of domain events to subscribers.

use crate::event::Event;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Handler = Box<dyn Fn(&Event) + Send + Sync>;

struct Subscriber {
    id: u64,
    handler: Handler,
}

/// Synchronous multicast emitter. `emit` invokes every live subscriber in
/// subscription order, on the caller's thread; no buffering, no filtering.
/// A subscriber's panic is isolated and logged, never stopping later
/// subscribers from running.
#[derive(Clone, Default)]
pub struct EventEmitter {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

/// Returned by [`EventEmitter::subscribe`]; dropping it does *not*
/// unsubscribe — call [`Unsubscribe::cancel`] explicitly, matching the
/// spec's `subscribe(handler) -> unsubscribe` (a handle, not a guard).
pub struct Unsubscribe {
    id: u64,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl Unsubscribe {
    pub fn cancel(self) {
        self.subscribers.lock().retain(|s| s.id != self.id);
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; returns a handle that removes it on `cancel()`.
    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        Unsubscribe {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Invoke every live subscriber, in subscription order, synchronously.
    pub fn emit(&self, event: &Event) {
        let guard = self.subscribers.lock();
        for subscriber in guard.iter() {
            let handler = &subscriber.handler;
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                tracing::error!(
                    event_kind = event.kind(),
                    subscriber_id = subscriber.id,
                    ?panic,
                    "event subscriber panicked; isolating and continuing"
                );
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
#[path = "event_emitter_tests.rs"]
mod tests;
