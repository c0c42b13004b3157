//! Host bus boundary
//!
//! Inbound fixes and operator commands arrive as [`BusEvent`]s; query
//! replies leave as [`CommandResponse`]s. The daemon carries both over JSON
//! lines of the form `{"topic": "...", "data": ...}`.

use super::fix::GpsFix;
use super::protocol::CommandKind;
use crate::config::BusSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};

/// Event delivered to the driver
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// New GPS fix
    Fix(GpsFix),
    /// Operator command by ordinal
    Command(i8),
}

/// Reply to a query command, as published on the response topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Command that produced the reply
    pub command: CommandKind,
    /// Decoded token followed by the command ordinal, e.g. `"28"`
    pub data: String,
}

impl CommandResponse {
    /// Build the published form from a decoded reply token
    pub fn new(token: &str, command: CommandKind) -> Self {
        Self {
            command,
            data: format!("{}{}", token, command.id()),
        }
    }
}

/// Bus framing errors
#[derive(Error, Debug)]
pub enum BusError {
    /// Line is not a JSON envelope
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// Command payload is not a small integer
    #[error("Invalid command payload: {0}")]
    InvalidCommand(Value),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    topic: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct Outbound<'a> {
    topic: &'a str,
    data: &'a str,
}

/// Maps topic envelopes to driver events
#[derive(Debug, Clone, Default)]
pub struct BusRouter {
    topics: BusSettings,
}

impl BusRouter {
    /// Create a router for the given topic names
    pub fn new(topics: BusSettings) -> Self {
        Self { topics }
    }

    /// Parse one JSON line. Returns `Ok(None)` for topics the driver does not
    /// subscribe to.
    pub fn route(&self, line: &str) -> Result<Option<BusEvent>, BusError> {
        let envelope: Envelope = serde_json::from_str(line)?;

        if envelope.topic == self.topics.fix_topic {
            let fix: GpsFix = serde_json::from_value(envelope.data)?;
            return Ok(Some(BusEvent::Fix(fix)));
        }

        if envelope.topic == self.topics.command_topic {
            // Accept both a bare integer and `{"data": n}` / `{"value": n}`
            let raw = match &envelope.data {
                Value::Object(map) => map.get("data").or_else(|| map.get("value")).cloned(),
                other => Some(other.clone()),
            };
            let value = raw
                .as_ref()
                .and_then(Value::as_i64)
                .and_then(|v| i8::try_from(v).ok())
                .ok_or(BusError::InvalidCommand(envelope.data))?;
            return Ok(Some(BusEvent::Command(value)));
        }

        tracing::debug!("Ignoring message on topic {}", envelope.topic);
        Ok(None)
    }

    /// Serialize a response for the response topic
    pub fn format_response(&self, response: &CommandResponse) -> String {
        let message = Outbound {
            topic: &self.topics.response_topic,
            data: &response.data,
        };
        serde_json::to_string(&message).unwrap_or_default()
    }
}

/// Feed JSON lines from `reader` into the driver until EOF or until the
/// driver goes away. Bad lines are logged and skipped.
///
/// Blocks the calling thread; run it on a dedicated thread, never inside the
/// async runtime.
pub fn pump_inbound<R>(reader: R, router: &BusRouter, events: &mpsc::Sender<BusEvent>) -> std::io::Result<()>
where
    R: BufRead,
{
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match router.route(line) {
            Ok(Some(event)) => {
                if events.blocking_send(event).is_err() {
                    tracing::debug!("Driver stopped, closing inbound bus");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping bus line: {}", e),
        }
    }
    Ok(())
}

/// Write every published response to `writer` as a JSON line until the
/// driver drops its sender.
pub async fn pump_outbound<W>(
    mut writer: W,
    router: &BusRouter,
    mut responses: broadcast::Receiver<CommandResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match responses.recv().await {
            Ok(response) => {
                let mut line = router.format_response(&response);
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Response writer lagged, {} responses lost", n);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    Ok(())
}
