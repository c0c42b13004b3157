//! Core module containing the driver functionality
//!
//! This module provides:
//! - PIXSE configuration protocol (commands, encoder, reply decoder, checksum)
//! - Pending command queue
//! - Connection-per-request TCP transport
//! - Host bus boundary (inbound fixes and commands, outbound replies)
//! - Drive loop with retry/drop policy
//! - Wire traffic logging

pub mod bus;
pub mod driver;
pub mod fix;
pub mod logger;
pub mod protocol;
pub mod queue;
pub mod transport;
