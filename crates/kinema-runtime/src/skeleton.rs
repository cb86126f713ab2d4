//! Skeleton boundary - where resolved poses leave KINEMA

use kinema_core::{KinemaResult, Pose, RestPose, Target};

/// Avatar rig that accepts per-target poses
pub trait Skeleton {
    /// Write the final pose for `target`
    fn apply(&mut self, target: Target, pose: Pose) -> KinemaResult<()>;

    /// Current placement of a named bone
    fn bone(&self, name: &str) -> Option<Pose>;

    /// Signed body roll in [-1, 1] for secondary effects
    fn apply_lean_roll_rate(&mut self, _rate: f32) {}
}

/// Read the rest pose of a loaded rig
pub fn rest_pose_of(skeleton: &dyn Skeleton) -> KinemaResult<RestPose> {
    RestPose::from_lookup(|name| skeleton.bone(name))
}
