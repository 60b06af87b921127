// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.14 Command protocol: one newline-delimited JSON object per request,
//! one per response, one request per connection. Grounded in the teacher's
//! `protocol_wire.rs` framing helpers, narrowed from a 4-byte length-prefix
//! wire format to the plain `\n`-terminated shape §4.14 specifies.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use foreman_core::{Command, StatusSnapshot};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed before a complete message was read")]
    ConnectionClosed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One request frame: the command plus nothing else (the socket is
/// per-connection, so no request id is needed to correlate responses).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Response {
    Ack,
    Status(StatusSnapshot),
    Error { message: String },
}

/// Reads exactly one `\n`-terminated JSON request from `reader`.
pub async fn read_request<R>(reader: &mut BufReader<R>) -> Result<Request, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Writes one `\n`-terminated JSON response to `writer`.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), ProtocolError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(response)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(value)?)
}

/// Encodes a request as the `\n`-terminated line a client writes to the
/// socket (used by both the CLI client and tests).
pub fn encode_request(command: &Command) -> Result<String, ProtocolError> {
    let mut line = encode(&Request { command: command.clone() })?;
    line.push('\n');
    Ok(line)
}

/// Decodes a single response line (used by the CLI client).
pub fn decode_response(line: &str) -> Result<Response, ProtocolError> {
    Ok(serde_json::from_str::<Response>(line.trim_end())?)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
