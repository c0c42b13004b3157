//! INS configuration commands
//!
//! The host addresses commands by a small integer ordinal (1-9). Each ordinal
//! maps to one fixed `$PIXSE,CONFIG` payload.

use super::EncodeError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Configuration command understood by the INS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(i8)]
pub enum CommandKind {
    /// Reset the INS
    Reset = 1,
    /// Start mode "wait for position"
    StartWaitForPosition = 2,
    /// Start mode "restore position"
    StartRestorePosition = 3,
    /// Start mode "restore attitude"
    StartRestoreAttitude = 4,
    /// Ignore GPS data in the Kalman filter
    IgnoreGps = 5,
    /// Use GPS data in the Kalman filter
    UseGps = 6,
    /// Push the latest GPS fix as a manual position
    SetManualFix = 7,
    /// Query the GPS Kalman filter mode
    QueryGpsStatus = 8,
    /// Query the configured start mode
    QueryStartMode = 9,
}

impl CommandKind {
    /// Every command, in ordinal order
    pub const ALL: [CommandKind; 9] = [
        Self::Reset,
        Self::StartWaitForPosition,
        Self::StartRestorePosition,
        Self::StartRestoreAttitude,
        Self::IgnoreGps,
        Self::UseGps,
        Self::SetManualFix,
        Self::QueryGpsStatus,
        Self::QueryStartMode,
    ];

    /// Numeric identifier used on the host bus
    pub fn id(self) -> i8 {
        self as i8
    }

    /// Short kebab-case name
    pub fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::StartWaitForPosition => "start-wait-for-position",
            Self::StartRestorePosition => "start-restore-position",
            Self::StartRestoreAttitude => "start-restore-attitude",
            Self::IgnoreGps => "ignore-gps",
            Self::UseGps => "use-gps",
            Self::SetManualFix => "set-manual-fix",
            Self::QueryGpsStatus => "query-gps-status",
            Self::QueryStartMode => "query-start-mode",
        }
    }

    /// Payload template; the manual fix fields are filled in at encode time
    pub fn template(self) -> &'static str {
        match self {
            Self::Reset => "RESET_",
            Self::StartWaitForPosition => "START_,1",
            Self::StartRestorePosition => "START_,2",
            Self::StartRestoreAttitude => "START_,3",
            Self::IgnoreGps => "GPSKFM,1",
            Self::UseGps => "GPSKFM,2",
            Self::SetManualFix => "MANGPS,<lat>,<lon>,<alt>,0.5,0.5,5.0",
            Self::QueryGpsStatus => "GPSKFM,,",
            Self::QueryStartMode => "START_,,",
        }
    }

    /// Whether encoding needs a received GPS fix
    pub fn requires_fix(self) -> bool {
        matches!(self, Self::SetManualFix)
    }

    /// Whether the device answers this command with a reply to parse
    pub fn expects_reply(self) -> bool {
        matches!(self, Self::QueryGpsStatus | Self::QueryStartMode)
    }
}

impl TryFrom<i8> for CommandKind {
    type Error = EncodeError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == value)
            .ok_or(EncodeError::UnknownCommand(value))
    }
}

impl FromStr for CommandKind {
    type Err = EncodeError;

    /// Accepts either the ordinal (`"8"`) or the name (`"query-gps-status"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i8>() {
            return Self::try_from(id);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EncodeError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}
