//! Rest pose - per-model placements read from the skeleton on load

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{KinemaError, KinemaResult, Pose, Target};

/// Bone names looked up on the skeleton
pub mod bones {
    pub const LEFT_HAND: &str = "LeftHand";
    pub const RIGHT_HAND: &str = "RightHand";
    pub const HEAD: &str = "Head";
    pub const HIPS: &str = "Hips";
    pub const CHEST: &str = "Chest";
}

/// Rest placements of the arbitrated targets for the loaded avatar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestPose {
    pub left_hand: Pose,
    pub right_hand: Pose,
    pub head: Pose,
    pub hips: Pose,
    pub chest: Pose,
}

impl Default for RestPose {
    /// A 1.6m humanoid standing at the origin, facing +z
    fn default() -> Self {
        Self {
            left_hand: Pose::new(Vec3::new(-0.22, 0.78, 0.02), Quat::from_rotation_z(-0.1)),
            right_hand: Pose::new(Vec3::new(0.22, 0.78, 0.02), Quat::from_rotation_z(0.1)),
            head: Pose::from_position(Vec3::new(0.0, 1.45, 0.0)),
            hips: Pose::from_position(Vec3::new(0.0, 0.9, 0.0)),
            chest: Pose::from_position(Vec3::new(0.0, 1.2, 0.0)),
        }
    }
}

impl RestPose {
    /// Build from a bone lookup; every bone is required
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<Pose>) -> KinemaResult<Self> {
        let mut bone = |name: &str| -> KinemaResult<Pose> {
            let pose = lookup(name).ok_or_else(|| KinemaError::MissingBone(name.to_string()))?;
            if pose.is_finite() {
                Ok(pose)
            } else {
                Err(KinemaError::SkeletonError(format!("non-finite rest pose for {name}")))
            }
        };
        Ok(Self {
            left_hand: bone(bones::LEFT_HAND)?,
            right_hand: bone(bones::RIGHT_HAND)?,
            head: bone(bones::HEAD)?,
            hips: bone(bones::HIPS)?,
            chest: bone(bones::CHEST)?,
        })
    }

    /// Neutral pose for a target
    pub fn pose(&self, target: Target) -> Pose {
        match target {
            Target::LeftHand => self.left_hand,
            Target::RightHand => self.right_hand,
            Target::HeadLookAt => self.look_ahead(),
            Target::Body => self.hips,
        }
    }

    /// Look-at point one meter in front of the head
    pub fn look_ahead(&self) -> Pose {
        Pose::from_position(self.head.position + Vec3::Z)
    }

    /// Shoulder width estimated from the hand spread
    pub fn shoulder_width(&self) -> f32 {
        (self.right_hand.position.x - self.left_hand.position.x).abs() * 0.8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_requires_all_bones() {
        let rest = RestPose::default();
        let result = RestPose::from_lookup(|name| match name {
            bones::HEAD => Some(rest.head),
            _ => None,
        });
        assert!(matches!(result, Err(KinemaError::MissingBone(_))));
    }

    #[test]
    fn test_from_lookup_roundtrip() {
        let rest = RestPose::default();
        let built = RestPose::from_lookup(|name| match name {
            bones::LEFT_HAND => Some(rest.left_hand),
            bones::RIGHT_HAND => Some(rest.right_hand),
            bones::HEAD => Some(rest.head),
            bones::HIPS => Some(rest.hips),
            bones::CHEST => Some(rest.chest),
            _ => None,
        })
        .unwrap();
        assert_eq!(built, rest);
    }

    #[test]
    fn test_look_ahead_is_in_front_of_head() {
        let rest = RestPose::default();
        let look = rest.pose(Target::HeadLookAt);
        assert!(look.position.z > rest.head.position.z);
        assert_eq!(look.position.y, rest.head.position.y);
    }
}
