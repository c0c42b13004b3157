//! CLI Exit Codes
//!
//! Stable exit codes so scripts can tell a dead INS from a bad argument.

use crate::config::ConfigError;
use crate::core::driver::AttemptError;
use crate::core::protocol::EncodeError;
use crate::core::transport::TransportError;
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// No reply in time
    pub const TIMEOUT: u8 = 4;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Protocol error (write failed, malformed reply)
    pub const PROTOCOL_ERROR: u8 = 9;

    /// Manual fix requested without position
    pub const NO_FIX: u8 = 10;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Success carrying output
    pub fn success_with_message(msg: impl Into<String>) -> Self {
        Self::Success(Some(msg.into()))
    }

    /// Error with an explicit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) | Self::Error(_, msg) => Some(msg),
            Self::Success(None) => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<EncodeError> for CliResult {
    fn from(err: EncodeError) -> Self {
        let code = match err {
            EncodeError::NoFixAvailable => ExitCodes::NO_FIX,
            EncodeError::UnknownCommand(_) | EncodeError::UnknownName(_) => ExitCodes::INVALID_ARGS,
        };
        Self::Error(code, err.to_string())
    }
}

impl From<TransportError> for CliResult {
    fn from(err: TransportError) -> Self {
        let code = match &err {
            TransportError::ConnectFailed(msg) if msg.contains("timed out") => ExitCodes::TIMEOUT,
            TransportError::ConnectFailed(_) => ExitCodes::CONNECTION_FAILED,
            TransportError::ReadFailed(_) => ExitCodes::TIMEOUT,
            TransportError::WriteFailed(_) | TransportError::Decode(_) => ExitCodes::PROTOCOL_ERROR,
        };
        Self::Error(code, err.to_string())
    }
}

impl From<AttemptError> for CliResult {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::Encode(e) => e.into(),
            AttemptError::Transport(e) => e.into(),
        }
    }
}

impl From<ConfigError> for CliResult {
    fn from(err: ConfigError) -> Self {
        Self::Error(ExitCodes::CONFIG_ERROR, err.to_string())
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        4 => "Timeout",
        8 => "Configuration error",
        9 => "Protocol error",
        10 => "No GPS fix available",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in [0, 1, 2, 3, 4, 8, 9, 10] {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
