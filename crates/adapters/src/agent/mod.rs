// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent SDK adapter (§6 "Agent SDK").
//!
//! The core depends only on [`AgentSdk`]: given a prompt, a cwd, and a
//! cancellation token, it returns an async stream of [`AgentMessage`]s plus
//! an interrupt handle. [`claude::ClaudeAgentSdk`] implements this by
//! spawning the agent CLI as a subprocess with `--output-format
//! stream-json` and parsing newline-delimited JSON from its stdout;
//! [`fake::FakeAgentSdk`] backs engine-level tests.

mod claude;

pub use claude::ClaudeAgentSdk;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgentSdk, ScriptedTurn};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum AgentSdkError {
    #[error("failed to spawn agent process: {0}")]
    SpawnFailed(String),
    #[error("agent stream ended unexpectedly: {0}")]
    StreamError(String),
}

/// Input to [`AgentSdk::query`] (§6).
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub prompt: String,
    pub agent_name: String,
    pub cwd: PathBuf,
    pub model_override: Option<String>,
}

/// One `content` block inside an `assistant` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    ToolUse { name: String },
}

/// The tagged union of messages the core discriminates (§6, §4.8).
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    SystemInit {
        session_id: String,
        model: Option<String>,
        cwd: Option<String>,
    },
    Assistant {
        content: Vec<ContentBlock>,
    },
    ResultSuccess {
        duration_ms: Option<u64>,
        total_cost_usd: Option<f64>,
        num_turns: Option<u64>,
    },
    ResultError {
        subtype: String,
    },
    /// Any other shape; logged verbatim (§6, §9).
    Unknown {
        raw: String,
    },
}

/// A running query: messages arrive on `rx`; `interrupt()` asks the
/// underlying process to stop (best effort).
pub struct QueryHandle {
    pub rx: mpsc::Receiver<AgentMessage>,
    pub cancel: CancellationToken,
}

/// The query-factory seam (§6 "Agent SDK"). Spawns an agent run and returns a
/// handle streaming its messages.
#[async_trait]
pub trait AgentSdk: Clone + Send + Sync + 'static {
    async fn query(&self, params: QueryParams) -> Result<QueryHandle, AgentSdkError>;
}

fn get_str<'a>(obj: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(|v| v.as_str())
}

/// Parse one newline-delimited JSON record into the tagged union the core
/// discriminates (§6, §9 "narrow tagged-union decoder"). Validates `type`
/// (and `subtype` where present) before dispatching; anything else is kept
/// verbatim as [`AgentMessage::Unknown`].
pub fn parse_message(json: &serde_json::Value) -> AgentMessage {
    match get_str(json, "type") {
        Some("system") if get_str(json, "subtype") == Some("init") => AgentMessage::SystemInit {
            session_id: get_str(json, "session_id").unwrap_or_default().to_string(),
            model: get_str(json, "model").map(String::from),
            cwd: get_str(json, "cwd").map(String::from),
        },
        Some("assistant") => {
            let content = json
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_array())
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter_map(|block| match get_str(block, "type") {
                            Some("text") => {
                                get_str(block, "text").map(|t| ContentBlock::Text(t.to_string()))
                            }
                            Some("tool_use") => get_str(block, "name")
                                .map(|n| ContentBlock::ToolUse { name: n.to_string() }),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            AgentMessage::Assistant { content }
        }
        Some("result") => match get_str(json, "subtype") {
            Some("success") => AgentMessage::ResultSuccess {
                duration_ms: json.get("duration_ms").and_then(|v| v.as_u64()),
                total_cost_usd: json.get("total_cost_usd").and_then(|v| v.as_f64()),
                num_turns: json.get("num_turns").and_then(|v| v.as_u64()),
            },
            Some(subtype) if subtype.starts_with("error") => {
                AgentMessage::ResultError { subtype: subtype.to_string() }
            }
            _ => AgentMessage::Unknown { raw: json.to_string() },
        },
        _ => AgentMessage::Unknown { raw: json.to_string() },
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
