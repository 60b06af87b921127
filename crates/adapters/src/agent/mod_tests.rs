// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::fake::{FakeAgentSdk, ScriptedTurn};
use serde_json::json;
use std::path::PathBuf;
use yare::parameterized;

fn params() -> QueryParams {
    QueryParams {
        prompt: "implement #42".to_string(),
        agent_name: "implementor".to_string(),
        cwd: PathBuf::from("/tmp/worktree"),
        model_override: None,
    }
}

#[test]
fn parse_message_decodes_system_init() {
    let value = json!({"type": "system", "subtype": "init", "session_id": "s1", "model": "sonnet", "cwd": "/repo"});
    let message = parse_message(&value);
    assert_eq!(
        message,
        AgentMessage::SystemInit {
            session_id: "s1".to_string(),
            model: Some("sonnet".to_string()),
            cwd: Some("/repo".to_string()),
        }
    );
}

#[test]
fn parse_message_decodes_assistant_text_and_tool_use() {
    let value = json!({
        "type": "assistant",
        "message": {"content": [
            {"type": "text", "text": "looking at the issue"},
            {"type": "tool_use", "name": "Read"},
        ]}
    });
    let message = parse_message(&value);
    assert_eq!(
        message,
        AgentMessage::Assistant {
            content: vec![
                ContentBlock::Text("looking at the issue".to_string()),
                ContentBlock::ToolUse { name: "Read".to_string() },
            ]
        }
    );
}

#[parameterized(
    success = {"success", true},
    error_during_execution = {"error_during_execution", false},
    error_max_turns = {"error_max_turns", false},
)]
fn parse_message_decodes_result_subtypes(subtype: &str, is_success: bool) {
    let value = json!({"type": "result", "subtype": subtype, "duration_ms": 500});
    let message = parse_message(&value);
    match message {
        AgentMessage::ResultSuccess { .. } => assert!(is_success),
        AgentMessage::ResultError { subtype: got } => {
            assert!(!is_success);
            assert_eq!(got, subtype);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn parse_message_unrecognized_shape_is_unknown() {
    let value = json!({"type": "something_else"});
    assert!(matches!(parse_message(&value), AgentMessage::Unknown { .. }));
}

#[tokio::test]
async fn fake_agent_sdk_replays_queued_turn_then_defaults_to_success() {
    let sdk = FakeAgentSdk::new().with_turn(ScriptedTurn::error("error_during_execution"));

    let mut first = sdk.query(params()).await.unwrap();
    let message = first.rx.recv().await.unwrap();
    assert!(matches!(message, AgentMessage::ResultError { .. }));
    assert!(first.rx.recv().await.is_none());

    let mut second = sdk.query(params()).await.unwrap();
    let mut messages = Vec::new();
    while let Some(m) = second.rx.recv().await {
        messages.push(m);
    }
    assert!(matches!(messages.last(), Some(AgentMessage::ResultSuccess { .. })));
}

#[tokio::test]
async fn fake_agent_sdk_records_query_params() {
    let sdk = FakeAgentSdk::new();
    sdk.query(params()).await.unwrap();
    let calls = sdk.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].agent_name, "implementor");
}
