// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_core::StatusSnapshot;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

#[tokio::test]
async fn reports_not_running_when_the_socket_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let err = DaemonClient::connect(&path).await.unwrap_err();
    assert!(matches!(err, ClientError::DaemonNotRunning(_)));
}

async fn fake_daemon(listener: UnixListener, response: Response) {
    let (stream, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    let mut payload = serde_json::to_vec(&response).unwrap();
    payload.push(b'\n');
    write_half.write_all(&payload).await.unwrap();
}

#[tokio::test]
async fn sends_a_request_and_decodes_an_ack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(fake_daemon(listener, Response::Ack));

    let client = DaemonClient::connect(&path).await.unwrap();
    let response = client.send(Command::CancelPlanner).await.unwrap();
    assert_eq!(response, Response::Ack);
    server.await.unwrap();
}

#[tokio::test]
async fn sends_a_request_and_decodes_a_status_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let snapshot = StatusSnapshot { work_item_count: 1, planner_running: true, sessions: Vec::new() };
    let server = tokio::spawn(fake_daemon(listener, Response::Status(snapshot.clone())));

    let client = DaemonClient::connect(&path).await.unwrap();
    let response = client.send(Command::Status).await.unwrap();
    assert_eq!(response, Response::Status(snapshot));
    server.await.unwrap();
}

#[tokio::test]
async fn a_remote_error_response_surfaces_as_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(fake_daemon(listener, Response::Error { message: "no such work item".into() }));

    let client = DaemonClient::connect(&path).await.unwrap();
    let err = client.send(Command::CancelPlanner).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(m) if m == "no such work item"));
    server.await.unwrap();
}
