//! # INS Driver Core Library
//!
//! Mediates between a host control process and an inertial navigation
//! system configured over `$PIXSE,CONFIG` ASCII frames on TCP:
//! - GPS fixes become manual position updates
//! - Operator commands (reset, start mode, GPS usage, queries) are queued
//! - Each request goes out on its own connection, with bounded retries
//! - Query replies are decoded and republished to subscribers
//!
//! ## Example
//!
//! ```rust,no_run
//! use ins_driver::{BusEvent, Driver, DriverSettings, TcpConfig, TcpSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = TcpSession::new(TcpConfig::new("10.0.1.10", 8110));
//!     let driver = Driver::new(Box::new(session), DriverSettings::default());
//!     let mut responses = driver.subscribe();
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(5);
//!     tokio::spawn(driver.run(rx));
//!
//!     tx.send(BusEvent::Command(8)).await?;
//!     if let Ok(response) = responses.recv().await {
//!         println!("GPS status: {}", response.data);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes, OutputFormat};
pub use crate::config::{AppConfig, BusSettings, DriverSettings, LoggingConfig};
pub use crate::core::bus::{BusEvent, BusRouter, CommandResponse};
pub use crate::core::driver::{Driver, DriverStats, DriveStatus, PollOutcome};
pub use crate::core::fix::{FixState, GpsFix};
pub use crate::core::logger::{LogFormat, WireLogger};
pub use crate::core::protocol::{decode, encode, CommandKind, DecodeError, EncodeError, Request};
pub use crate::core::queue::CommandQueue;
pub use crate::core::transport::{DeviceLink, TcpConfig, TcpSession, TransportError, TransportStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
