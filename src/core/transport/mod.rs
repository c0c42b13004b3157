//! Transport layer towards the INS configuration port
//!
//! Every request goes out on a fresh TCP connection that is closed again
//! before the call returns. The drive loop only sees the [`DeviceLink`]
//! trait, so it can run against the real session or a test double.

mod tcp;

pub use tcp::{TcpConfig, TcpSession};

use crate::core::protocol::DecodeError;
use async_trait::async_trait;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Endpoint unreachable, refused or connect timed out
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    /// The request could not be written completely
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// No reply before the deadline, or the peer closed early
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// A reply arrived but could not be parsed
    #[error("Invalid reply: {0}")]
    Decode(#[from] DecodeError),
}

impl TransportError {
    /// Short label used in logs and stats
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectFailed(_) => "connect",
            Self::WriteFailed(_) => "write",
            Self::ReadFailed(_) => "read",
            Self::Decode(_) => "decode",
        }
    }
}

/// Transport statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
    /// Frames sent
    pub frames_sent: u64,
    /// Replies received
    pub replies_received: u64,
    /// Connections opened
    pub connections: u64,
    /// Errors count
    pub errors: u64,
}

/// One request/response exchange with the device
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Send a complete frame. When `expect_reply` is set, read the reply and
    /// return its decoded value token.
    async fn send(&self, message: &str, expect_reply: bool) -> Result<Option<String>, TransportError>;

    /// Get connection info string
    fn connection_info(&self) -> String;

    /// Get statistics
    fn stats(&self) -> TransportStats {
        TransportStats::default()
    }
}
