// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.14's socket listener: accepts connections concurrently, but routes
//! every request through the same engine command channel the event loop
//! drains (§5's single-consumer discipline) — concurrency lives in how many
//! connections can be *accepted* and *waiting on a response*, not in how
//! state is mutated. Grounded in the teacher's `listener/mod.rs` accept
//! loop, narrowed to the five-command-plus-status surface of §4.10/§4.14.

use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use foreman_core::Command;
use foreman_engine::{CommandResponse, EngineCommand};

use crate::protocol::{self, ProtocolError, Response};

/// Runs the accept loop until `listener` is dropped or the process exits.
/// Each accepted connection is handled on its own task so a slow or stuck
/// client cannot block other CLI invocations from connecting.
pub async fn run(listener: UnixListener, command_tx: mpsc::Sender<EngineCommand>) {
    loop {
        let (stream, _addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "failed to accept daemon connection");
                continue;
            }
        };
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, command_tx).await {
                debug!(error = %e, "daemon connection ended with an error");
            }
        });
    }
}

async fn handle_connection(
    stream: UnixStream,
    command_tx: mpsc::Sender<EngineCommand>,
) -> Result<(), ProtocolError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let request = match protocol::read_request(&mut reader).await {
        Ok(request) => request,
        Err(ProtocolError::ConnectionClosed) => return Ok(()),
        Err(e) => {
            let response = Response::Error { message: e.to_string() };
            protocol::write_response(&mut write_half, &response).await?;
            return Err(e);
        }
    };

    let response = dispatch(request.command, &command_tx).await;
    protocol::write_response(&mut write_half, &response).await
}

async fn dispatch(command: Command, command_tx: &mpsc::Sender<EngineCommand>) -> Response {
    let (respond_to, recv) = oneshot::channel();
    let engine_command = EngineCommand { command, respond_to };
    if command_tx.send(engine_command).await.is_err() {
        return Response::Error { message: "engine command channel closed".into() };
    }
    match recv.await {
        Ok(CommandResponse::Ack) => Response::Ack,
        Ok(CommandResponse::Status(snapshot)) => Response::Status(snapshot),
        Err(_) => Response::Error { message: "engine dropped the response channel".into() },
    }
}

/// Test-only seam: runs the accept loop for exactly one connection, so
/// tests can assert on a single request/response round trip without racing
/// a `tokio::spawn`'d infinite loop.
#[cfg(test)]
pub(crate) async fn accept_one(
    listener: &UnixListener,
    command_tx: mpsc::Sender<EngineCommand>,
) -> Result<(), ProtocolError> {
    let (stream, _addr) = listener.accept().await?;
    handle_connection(stream, command_tx).await
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
