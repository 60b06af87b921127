// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run session state (§4.8). A `Session` is pure data plus the
//! synchronization primitives the manager's procedures coordinate through;
//! the procedures themselves live in `agent_manager::mod`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use foreman_core::{AgentRole, AgentSessionInfo, Clock, SessionId, SessionStatus, WorkItemId};

use crate::session_log::SessionLog;

/// One chunk of agent output, or the end-of-stream sentinel (§4.8
/// "notifies each output listener with a stream-end sentinel").
#[derive(Debug, Clone)]
pub enum SessionOutputEvent {
    Chunk(String),
    End,
}

pub struct Session<C: Clock> {
    pub role: AgentRole,
    pub work_item_id: Option<WorkItemId>,
    pub spec_paths: Vec<String>,
    pub branch_name: Option<String>,
    pub started_at: DateTime<Utc>,

    pub(super) session_id: Mutex<Option<SessionId>>,
    pub(super) working_copy_path: Mutex<Option<PathBuf>>,
    pub(super) log: Mutex<Option<SessionLog<C>>>,
    pub(super) buffer: Mutex<String>,
    pub(super) listeners: Mutex<Vec<mpsc::UnboundedSender<SessionOutputEvent>>>,

    pub(super) done: AtomicBool,
    pub(super) cancel: CancellationToken,
    pub(super) handle_cancel: Mutex<Option<CancellationToken>>,
    pub(super) deadline: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock> Session<C> {
    pub fn new(
        role: AgentRole,
        work_item_id: Option<WorkItemId>,
        spec_paths: Vec<String>,
        branch_name: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Arc<Self> {
        Arc::new(Self {
            role,
            work_item_id,
            spec_paths,
            branch_name,
            started_at,
            session_id: Mutex::new(None),
            working_copy_path: Mutex::new(None),
            log: Mutex::new(None),
            buffer: Mutex::new(String::new()),
            listeners: Mutex::new(Vec::new()),
            done: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            handle_cancel: Mutex::new(None),
            deadline: Mutex::new(None),
        })
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Sets `done`, returning whether this call was the one that set it
    /// (finalization's idempotency gate).
    pub fn mark_done(&self) -> bool {
        !self.done.swap(true, Ordering::SeqCst)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id.lock().clone()
    }

    pub fn publish_chunk(&self, chunk: String) {
        self.buffer.lock().push_str(&chunk);
        self.listeners.lock().retain(|tx| tx.send(SessionOutputEvent::Chunk(chunk.clone())).is_ok());
    }

    pub fn notify_end(&self) {
        let mut listeners = self.listeners.lock();
        for tx in listeners.drain(..) {
            let _ = tx.send(SessionOutputEvent::End);
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionOutputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let buffered = self.buffer.lock().clone();
        if !buffered.is_empty() {
            let _ = tx.send(SessionOutputEvent::Chunk(buffered));
        }
        self.listeners.lock().push(tx);
        rx
    }

    pub fn info(&self, status: SessionStatus) -> AgentSessionInfo {
        AgentSessionInfo {
            role: self.role,
            session_id: self.session_id().unwrap_or_default(),
            status,
            work_item_id: self.work_item_id,
            spec_paths: if self.spec_paths.is_empty() { None } else { Some(self.spec_paths.clone()) },
            branch_name: self.branch_name.clone(),
            log_file_path: self.log.lock().as_ref().map(|l| l.path().display().to_string()),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
