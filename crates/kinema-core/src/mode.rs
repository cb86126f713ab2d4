//! Global motion mode

use serde::{Deserialize, Serialize};

use crate::{GeneratorKind, Target};

/// Coarse override layered on top of per-target arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Normal arbitration between all generators
    #[default]
    Default,
    /// Hands hang at rest, device and hand tracking input ignored for hands
    StandingOnly,
    /// Hands and body follow game-input locomotion
    GameInputLocomotion,
}

impl MotionMode {
    /// Generator forced onto `target` by this mode, if any
    pub fn override_for(self, target: Target) -> Option<GeneratorKind> {
        match (self, target) {
            (MotionMode::StandingOnly, t) if t.is_hand() => Some(GeneratorKind::AlwaysDown),
            (MotionMode::GameInputLocomotion, t) if t.is_hand() || t == Target::Body => {
                Some(GeneratorKind::Locomotion)
            }
            _ => None,
        }
    }

    /// Whether `kind` may publish ownership requests for `target`
    pub fn allows(self, kind: GeneratorKind, target: Target) -> bool {
        match self {
            MotionMode::Default => kind != GeneratorKind::Locomotion,
            MotionMode::StandingOnly => {
                if kind == GeneratorKind::Locomotion {
                    return false;
                }
                !(target.is_hand() && (kind.is_device() || kind.is_hand_tracking()))
            }
            MotionMode::GameInputLocomotion => !kind.is_hand_tracking(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_has_no_overrides() {
        for target in Target::ALL {
            assert!(MotionMode::Default.override_for(target).is_none());
        }
        assert!(MotionMode::Default.allows(GeneratorKind::ImageHand, Target::LeftHand));
        assert!(!MotionMode::Default.allows(GeneratorKind::Locomotion, Target::Body));
    }

    #[test]
    fn test_standing_only_blocks_hand_input() {
        let mode = MotionMode::StandingOnly;
        assert_eq!(mode.override_for(Target::LeftHand), Some(GeneratorKind::AlwaysDown));
        assert!(mode.override_for(Target::HeadLookAt).is_none());
        assert!(!mode.allows(GeneratorKind::Typing, Target::RightHand));
        assert!(!mode.allows(GeneratorKind::MediaPipeHand, Target::LeftHand));
        assert!(mode.allows(GeneratorKind::Mouse, Target::HeadLookAt));
    }

    #[test]
    fn test_locomotion_disables_hand_tracking() {
        let mode = MotionMode::GameInputLocomotion;
        assert_eq!(mode.override_for(Target::Body), Some(GeneratorKind::Locomotion));
        assert!(!mode.allows(GeneratorKind::ImageHand, Target::Body));
        assert!(mode.allows(GeneratorKind::Locomotion, Target::LeftHand));
    }
}
