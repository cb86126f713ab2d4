//! Pose - position and rotation of one target
//!
//! A pose is a value: generators produce a fresh one every frame and
//! nothing holds on to a generator's pose across frames except the
//! arbiter's blend snapshot.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position + unit rotation for one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Linear position, spherical rotation
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t).normalize(),
        }
    }

    /// Move by an offset and rotate by `delta` applied after the current rotation
    pub fn transformed(&self, offset: Vec3, delta: Quat) -> Pose {
        Pose {
            position: self.position + offset,
            rotation: (self.rotation * delta).normalize(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Largest of position distance and rotation angle (radians)
    pub fn distance(&self, other: &Pose) -> f32 {
        let linear = self.position.distance(other.position);
        let angular = self.rotation.angle_between(other.rotation);
        linear.max(angular)
    }

    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}
