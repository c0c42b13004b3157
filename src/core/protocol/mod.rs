//! PIXSE configuration protocol
//!
//! Provides the command set, request encoder, reply decoder and the XOR
//! frame checksum used by the INS configuration port.

pub mod checksum;
pub mod command;
pub mod pixse;

pub use command::CommandKind;
pub use pixse::{decode, encode, Request, FRAME_PREFIX, FRAME_TERMINATOR};

use thiserror::Error;

/// Errors building a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The manual fix command was requested before any fix arrived
    #[error("No GPS fix available for manual position command")]
    NoFixAvailable,

    /// Ordinal outside the command set
    #[error("Unknown command id: {0}")]
    UnknownCommand(i8),

    /// Name outside the command set
    #[error("Unknown command name: {0}")]
    UnknownName(String),
}

/// Errors parsing a device reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No `,` in the reply, or no `*` after the last one
    #[error("Malformed reply: {0}")]
    Malformed(String),
}
