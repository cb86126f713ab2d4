//! Recording skeleton

use kinema_core::{bones, KinemaError, KinemaResult, Pose, RestPose, Target, TargetMap};
use kinema_runtime::Skeleton;

/// In-memory rig that keeps the last pose written to each target
#[derive(Debug, Clone)]
pub struct RecordingSkeleton {
    rest: RestPose,
    current: TargetMap<Option<Pose>>,
    roll_rate: f32,
    writes: u64,
    hidden_bone: Option<&'static str>,
    locked: Option<Target>,
}

impl RecordingSkeleton {
    pub fn new(rest: RestPose) -> Self {
        Self {
            rest,
            current: TargetMap::default(),
            roll_rate: 0.0,
            writes: 0,
            hidden_bone: None,
            locked: None,
        }
    }

    /// Default humanoid rest pose
    pub fn humanoid() -> Self {
        Self::new(RestPose::default())
    }

    /// Rig missing one bone, for load failures
    pub fn without_bone(mut self, name: &'static str) -> Self {
        self.hidden_bone = Some(name);
        self
    }

    /// Make writes to `target` fail
    pub fn lock(&mut self, target: Option<Target>) {
        self.locked = target;
    }

    pub fn rest(&self) -> &RestPose {
        &self.rest
    }

    pub fn pose(&self, target: Target) -> Option<Pose> {
        self.current[target]
    }

    pub fn roll_rate(&self) -> f32 {
        self.roll_rate
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Skeleton for RecordingSkeleton {
    fn apply(&mut self, target: Target, pose: Pose) -> KinemaResult<()> {
        if self.locked == Some(target) {
            return Err(KinemaError::SkeletonError(format!("{target} is locked")));
        }
        self.current[target] = Some(pose);
        self.writes += 1;
        Ok(())
    }

    fn bone(&self, name: &str) -> Option<Pose> {
        if self.hidden_bone == Some(name) {
            return None;
        }
        match name {
            bones::LEFT_HAND => Some(self.rest.left_hand),
            bones::RIGHT_HAND => Some(self.rest.right_hand),
            bones::HEAD => Some(self.rest.head),
            bones::HIPS => Some(self.rest.hips),
            bones::CHEST => Some(self.rest.chest),
            _ => None,
        }
    }

    fn apply_lean_roll_rate(&mut self, rate: f32) {
        self.roll_rate = rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bone() {
        let rig = RecordingSkeleton::humanoid().without_bone(bones::HEAD);
        assert!(rig.bone(bones::HEAD).is_none());
        assert!(rig.bone(bones::HIPS).is_some());
    }

    #[test]
    fn test_locked_target_rejects_writes() {
        let mut rig = RecordingSkeleton::humanoid();
        rig.lock(Some(Target::Body));
        assert!(rig.apply(Target::Body, Pose::IDENTITY).is_err());
        assert!(rig.apply(Target::LeftHand, Pose::IDENTITY).is_ok());
        assert_eq!(rig.writes(), 1);
    }
}
