// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_core::WorkItemId;
use tokio::io::BufReader;

#[tokio::test]
async fn round_trips_a_request_through_the_line_reader() {
    let command = Command::DispatchImplementor { work_item_id: WorkItemId::new(42) };
    let line = encode_request(&command).unwrap();
    assert!(line.ends_with('\n'));

    let mut reader = BufReader::new(line.as_bytes());
    let request = read_request(&mut reader).await.unwrap();
    assert_eq!(request.command, command);
}

#[tokio::test]
async fn empty_read_is_connection_closed() {
    let mut reader = BufReader::new(&b""[..]);
    let err = read_request(&mut reader).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn writes_a_newline_terminated_response() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::Ack).await.unwrap();
    assert_eq!(buf, b"{\"result\":\"ack\"}\n");
}

#[test]
fn decodes_a_status_response() {
    let snapshot = StatusSnapshot { work_item_count: 2, planner_running: false, sessions: Vec::new() };
    let mut line = serde_json::to_string(&Response::Status(snapshot.clone())).unwrap();
    line.push('\n');
    let decoded = decode_response(&line).unwrap();
    assert_eq!(decoded, Response::Status(snapshot));
}

#[test]
fn decodes_an_error_response() {
    let line = r#"{"result":"error","message":"boom"}"#;
    let decoded = decode_response(line).unwrap();
    assert_eq!(decoded, Response::Error { message: "boom".into() });
}

#[test]
fn malformed_json_is_rejected() {
    let err = decode_response("not json").unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}
