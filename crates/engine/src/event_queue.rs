// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.2 Event Queue: a FIFO of domain events with a rejecting mode used
//! during shutdown drain.

use std::collections::VecDeque;
use std::sync::Arc;

use foreman_core::Event;
use parking_lot::Mutex;
use tokio::sync::Notify;

type AllowPredicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;

struct Inner {
    queue: VecDeque<Event>,
    rejecting: bool,
    allow: Option<AllowPredicate>,
}

/// Single-consumer, multi-producer FIFO (§5). Producers are the pollers and
/// agent-session monitor tasks; the engine root is the sole consumer.
#[derive(Clone)]
pub struct EventQueue {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::new(),
                rejecting: false,
                allow: None,
            })),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Enqueue an event. Dropped (and logged) if rejecting mode is on and
    /// the allow-predicate, if any, returns false for this event.
    pub fn enqueue(&self, event: Event) {
        let mut inner = self.inner.lock();
        if inner.rejecting {
            let allowed = inner.allow.as_ref().is_some_and(|p| p(&event));
            if !allowed {
                tracing::info!(event_kind = event.kind(), "dropped event: queue is rejecting");
                return;
            }
        }
        inner.queue.push_back(event);
        drop(inner);
        self.notify.notify_one();
    }

    pub fn dequeue(&self) -> Option<Event> {
        self.inner.lock().queue.pop_front()
    }

    /// Wait until an event is available, then dequeue it.
    pub async fn recv(&self) -> Event {
        loop {
            if let Some(event) = self.dequeue() {
                return event;
            }
            self.notify.notified().await;
        }
    }

    pub fn size(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Turn rejecting mode on/off. `allow` is consulted only while on; it
    /// lets terminal agent events through during shutdown drain (§4.2, §4.12).
    pub fn set_rejecting(&self, on: bool, allow: Option<impl Fn(&Event) -> bool + Send + Sync + 'static>) {
        let mut inner = self.inner.lock();
        inner.rejecting = on;
        inner.allow = allow.map(|p| Box::new(p) as AllowPredicate);
    }
}

#[cfg(test)]
#[path = "event_queue_tests.rs"]
mod tests;
