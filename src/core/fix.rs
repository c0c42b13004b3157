//! Latest GPS fix received from the host

use serde::{Deserialize, Serialize};

/// GPS-derived position estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
}

impl GpsFix {
    /// Create a new fix
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Fix state tracked for the manual position command.
///
/// Empty until the first fix arrives; afterwards always holds the latest one.
#[derive(Debug, Clone, Default)]
pub struct FixState {
    latest: Option<GpsFix>,
}

impl FixState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly received fix
    pub fn update(&mut self, fix: GpsFix) {
        self.latest = Some(fix);
    }

    /// Latest fix, if any has ever been received
    pub fn current(&self) -> Option<&GpsFix> {
        self.latest.as_ref()
    }

    /// Whether a fix has ever been received
    pub fn has_fix(&self) -> bool {
        self.latest.is_some()
    }
}
