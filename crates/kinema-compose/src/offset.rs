//! Corrective rotation for a translated body
//!
//! Axes: `x` is the lateral offset (+ right), `y` the forward offset
//! (+ toward the camera). Pitch only engages while leaning forward.

use glam::{Quat, Vec2};
use kinema_core::rotation_from_degrees;
use serde::{Deserialize, Serialize};

/// Degrees of rotation per meter of body offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetCorrection {
    pub yaw_per_meter: f32,
    pub roll_per_meter: f32,
    pub pitch_per_meter: f32,
    pub max_yaw_degrees: f32,
    pub max_roll_degrees: f32,
    pub max_pitch_degrees: f32,
}

impl Default for OffsetCorrection {
    fn default() -> Self {
        Self {
            yaw_per_meter: 20.0,
            roll_per_meter: 40.0,
            pitch_per_meter: 60.0,
            max_yaw_degrees: 8.0,
            max_roll_degrees: 10.0,
            max_pitch_degrees: 12.0,
        }
    }
}

impl OffsetCorrection {
    /// Small rotation matching a planar offset
    pub fn rotation(&self, offset: Vec2) -> Quat {
        let (yaw, pitch, roll) = self.angles(offset);
        rotation_from_degrees(yaw, pitch, roll)
    }

    /// (yaw, pitch, roll) in degrees for a planar offset
    pub fn angles(&self, offset: Vec2) -> (f32, f32, f32) {
        let yaw = (offset.x * self.yaw_per_meter).clamp(-self.max_yaw_degrees, self.max_yaw_degrees);
        // Leaning into a sideways shift rolls toward it
        let roll = (-offset.x * self.roll_per_meter)
            .clamp(-self.max_roll_degrees, self.max_roll_degrees);
        let pitch = if offset.y > 0.0 {
            (offset.y * self.pitch_per_meter).min(self.max_pitch_degrees)
        } else {
            0.0
        };
        (yaw, pitch, roll)
    }
}
