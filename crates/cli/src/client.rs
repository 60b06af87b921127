// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.14's CLI half of the command protocol: connect, write one request
//! line, read one response line, disconnect. Grounded in the teacher's
//! `client.rs` `DaemonClient`, narrowed to the five-command-plus-status
//! surface and the newline-delimited framing of `foreman-daemon::protocol`.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use foreman_core::Command;
use foreman_daemon::protocol::{self, Response};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    DaemonNotRunning(std::path::PathBuf),
    #[error("I/O error talking to daemon: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response from daemon: {0}")]
    Protocol(#[from] protocol::ProtocolError),
    #[error("timed out connecting to daemon")]
    Timeout,
    #[error("daemon reported an error: {0}")]
    Remote(String),
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connects to the daemon's socket. Returns [`ClientError::DaemonNotRunning`]
    /// (rather than a raw I/O error) when nothing is listening, so callers
    /// can print a friendly message instead of a connection-refused trace.
    pub async fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path.to_path_buf()));
        }
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, UnixStream::connect(socket_path))
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|e| {
                if matches!(e.kind(), std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound) {
                    return std::io::Error::new(e.kind(), format!("{e} (is foremand running?)"));
                }
                e
            })?;
        Ok(Self { stream })
    }

    /// Sends one request and reads the one response the daemon writes back,
    /// per §4.14's "one request per connection" rule. Consumes `self`
    /// because the connection is not reused afterward.
    pub async fn send(mut self, command: Command) -> Result<Response, ClientError> {
        let line = protocol::encode_request(&command)?;
        self.stream.write_all(line.as_bytes()).await?;

        let mut reader = BufReader::new(self.stream);
        let mut response_line = String::new();
        let n = reader.read_line(&mut response_line).await?;
        if n == 0 {
            return Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "daemon closed the connection without responding",
            )));
        }
        let response = protocol::decode_response(&response_line)?;
        if let Response::Error { message } = &response {
            return Err(ClientError::Remote(message.clone()));
        }
        Ok(response)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
