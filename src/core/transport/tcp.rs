//! TCP transport implementation

use super::{DeviceLink, TransportError, TransportStats};
use crate::core::logger::Logger;
use crate::core::protocol;
use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// INS endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Reply read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Maximum reply size read back in one go
    pub reply_buffer: usize,
}

impl TcpConfig {
    /// Create a new TCP configuration
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout_ms: 1000,
            read_timeout_ms: 500,
            reply_buffer: 255,
        }
    }

    /// Set read timeout
    #[must_use]
    pub fn read_timeout(mut self, ms: u64) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Set connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self::new("10.0.1.10", 8110)
    }
}

/// Connection-per-request session with the INS
pub struct TcpSession {
    config: TcpConfig,
    stats: Arc<RwLock<TransportStats>>,
    wire_log: Option<Logger>,
}

impl TcpSession {
    /// Create a new session; nothing is connected until the first send
    pub fn new(config: TcpConfig) -> Self {
        Self {
            config,
            stats: Arc::new(RwLock::new(TransportStats::default())),
            wire_log: None,
        }
    }

    /// Record frames to a wire log
    #[must_use]
    pub fn with_wire_log(mut self, logger: Logger) -> Self {
        self.wire_log = Some(logger);
        self
    }

    /// Endpoint configuration
    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    async fn open(&self) -> Result<TcpStream, TransportError> {
        let addr = self.config.address();

        let stream = tokio::time::timeout(
            Duration::from_millis(self.config.connect_timeout_ms),
            TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| {
            TransportError::ConnectFailed(format!(
                "{} timed out after {} ms",
                addr, self.config.connect_timeout_ms
            ))
        })?
        .map_err(|e| TransportError::ConnectFailed(format!("{addr}: {e}")))?;

        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::ConnectFailed(format!("{addr}: {e}")))?;

        self.stats.write().connections += 1;
        Ok(stream)
    }

    async fn exchange(
        &self,
        stream: &mut TcpStream,
        message: &str,
        expect_reply: bool,
    ) -> Result<Option<String>, TransportError> {
        stream
            .write_all(message.as_bytes())
            .await
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;

        {
            let mut stats = self.stats.write();
            stats.bytes_sent += message.len() as u64;
            stats.frames_sent += 1;
        }
        if let Some(ref log) = self.wire_log {
            log.lock().log_tx(message.as_bytes());
        }

        if !expect_reply {
            return Ok(None);
        }

        let mut buffer = BytesMut::zeroed(self.config.reply_buffer);
        let n = tokio::time::timeout(
            Duration::from_millis(self.config.read_timeout_ms),
            stream.read(&mut buffer),
        )
        .await
        .map_err(|_| {
            TransportError::ReadFailed(format!(
                "no reply within {} ms",
                self.config.read_timeout_ms
            ))
        })?
        .map_err(|e| TransportError::ReadFailed(e.to_string()))?;

        if n == 0 {
            return Err(TransportError::ReadFailed(
                "connection closed before reply".to_string(),
            ));
        }
        buffer.truncate(n);

        {
            let mut stats = self.stats.write();
            stats.bytes_received += n as u64;
            stats.replies_received += 1;
        }
        if let Some(ref log) = self.wire_log {
            log.lock().log_rx(&buffer);
        }

        let token = protocol::decode(&buffer)?;
        Ok(Some(token))
    }
}

#[async_trait]
impl DeviceLink for TcpSession {
    async fn send(&self, message: &str, expect_reply: bool) -> Result<Option<String>, TransportError> {
        let mut stream = match self.open().await {
            Ok(stream) => stream,
            Err(e) => {
                self.stats.write().errors += 1;
                return Err(e);
            }
        };

        let result = self.exchange(&mut stream, message, expect_reply).await;
        stream.shutdown().await.ok();

        if result.is_err() {
            self.stats.write().errors += 1;
        }
        result
    }

    fn connection_info(&self) -> String {
        self.config.address()
    }

    fn stats(&self) -> TransportStats {
        self.stats.read().clone()
    }
}
