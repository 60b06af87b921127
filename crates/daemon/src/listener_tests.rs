// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use foreman_core::WorkItemId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as TokioBufReader};
use tokio::net::UnixStream;

fn socket_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("daemon.sock")
}

#[tokio::test]
async fn round_trips_a_dispatch_command_through_the_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();

    let (command_tx, mut command_rx) = mpsc::channel(1);
    let responder = tokio::spawn(async move {
        let cmd = command_rx.recv().await.unwrap();
        assert_eq!(cmd.command, Command::DispatchImplementor { work_item_id: WorkItemId::new(7) });
        let _ = cmd.respond_to.send(CommandResponse::Ack);
    });

    let accept = tokio::spawn(async move { accept_one(&listener, command_tx).await });

    let mut client = UnixStream::connect(&path).await.unwrap();
    let line = protocol::encode_request(&Command::DispatchImplementor { work_item_id: WorkItemId::new(7) }).unwrap();
    client.write_all(line.as_bytes()).await.unwrap();

    let mut reader = TokioBufReader::new(client);
    let mut response_line = String::new();
    reader.read_line(&mut response_line).await.unwrap();
    let response = protocol::decode_response(&response_line).unwrap();
    assert_eq!(response, Response::Ack);

    responder.await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn reports_an_error_when_the_engine_channel_is_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let listener = UnixListener::bind(&path).unwrap();

    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_rx);

    let accept = tokio::spawn(async move { accept_one(&listener, command_tx).await });

    let mut client = UnixStream::connect(&path).await.unwrap();
    let line = protocol::encode_request(&Command::Shutdown).unwrap();
    client.write_all(line.as_bytes()).await.unwrap();

    let mut reader = TokioBufReader::new(client);
    let mut response_line = String::new();
    reader.read_line(&mut response_line).await.unwrap();
    let response = protocol::decode_response(&response_line).unwrap();
    assert!(matches!(response, Response::Error { .. }));

    accept.await.unwrap().unwrap();
}
