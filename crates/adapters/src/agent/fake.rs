// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`AgentSdk`] for engine-level tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{AgentMessage, AgentSdk, AgentSdkError, QueryHandle, QueryParams};

/// One canned agent run: the messages [`FakeAgentSdk::query`] replays for
/// the next call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    pub messages: Vec<AgentMessage>,
}

impl ScriptedTurn {
    pub fn new(messages: Vec<AgentMessage>) -> Self {
        Self { messages }
    }

    pub fn success() -> Self {
        Self::new(vec![
            AgentMessage::SystemInit { session_id: "fake-session".to_string(), model: None, cwd: None },
            AgentMessage::ResultSuccess { duration_ms: Some(1), total_cost_usd: None, num_turns: Some(1) },
        ])
    }

    pub fn error(subtype: impl Into<String>) -> Self {
        Self::new(vec![AgentMessage::ResultError { subtype: subtype.into() }])
    }
}

#[derive(Debug, Default)]
struct State {
    queued: VecDeque<ScriptedTurn>,
    calls: Vec<QueryParams>,
}

/// Replays a queue of [`ScriptedTurn`]s, one per `query()` call. Calling
/// `query()` with an empty queue replays [`ScriptedTurn::success`].
#[derive(Debug, Default, Clone)]
pub struct FakeAgentSdk {
    state: Arc<Mutex<State>>,
}

impl FakeAgentSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.state.lock().queued.push_back(turn);
        self
    }

    pub fn calls(&self) -> Vec<QueryParams> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl AgentSdk for FakeAgentSdk {
    async fn query(&self, params: QueryParams) -> Result<QueryHandle, AgentSdkError> {
        let turn = {
            let mut state = self.state.lock();
            state.calls.push(params.clone());
            state.queued.pop_front().unwrap_or_else(ScriptedTurn::success)
        };

        let (tx, rx) = mpsc::channel(turn.messages.len().max(1));
        for message in turn.messages {
            // Bounded by the queue length above; never blocks.
            let _ = tx.try_send(message);
        }
        drop(tx);

        Ok(QueryHandle { rx, cancel: CancellationToken::new() })
    }
}
