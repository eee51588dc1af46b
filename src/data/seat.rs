use std::f32::consts::FRAC_PI_2;

use omi_common::Defaulted;
use serde::{Deserialize, Serialize};

pub const DEFAULT_KNEE_ANGLE: f32 = FRAC_PI_2;

/// Node-level `OMI_seat` block. Points are in the seat node's local space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatJson {
    #[serde(default)]
    pub back: [f32; 3],
    #[serde(default)]
    pub foot: [f32; 3],
    #[serde(default)]
    pub knee: [f32; 3],
    /// Angle between the spine and the back-knee line, in radians.
    #[serde(default, skip_serializing_if = "Defaulted::is_default")]
    pub angle: Defaulted<f32>,
}

impl SeatJson {
    /// A copy with the default knee angle made explicit.
    pub fn resolved(&self) -> Self {
        Self {
            angle: Defaulted::Specified(self.angle.resolve(DEFAULT_KNEE_ANGLE)),
            ..*self
        }
    }

    pub fn knee_angle(&self) -> f32 {
        self.angle.resolve(DEFAULT_KNEE_ANGLE)
    }
}
