//! Per-target generator priority
//!
//! When several generators ask for the same target in the same frame the
//! highest-ranked one wins, regardless of publish order. A generator that
//! is not listed for a target can never own it.

use kinema_core::{GeneratorKind, KinemaError, KinemaResult, Target};
use serde::{Deserialize, Serialize};

use GeneratorKind::*;

/// Ordered generator lists, highest priority first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTable {
    pub left_hand: Vec<GeneratorKind>,
    pub right_hand: Vec<GeneratorKind>,
    pub head_look_at: Vec<GeneratorKind>,
    pub body: Vec<GeneratorKind>,
}

impl Default for PriorityTable {
    fn default() -> Self {
        let hands = vec![
            Typing,
            Mouse,
            Presentation,
            Gamepad,
            ArcadeStick,
            CarHandle,
            MediaPipeHand,
            ImageHand,
            Locomotion,
            Idle,
            AlwaysDown,
        ];
        Self {
            left_hand: hands.clone(),
            right_hand: hands,
            head_look_at: vec![Mouse, Presentation, FaceTracker, Locomotion, Idle, AlwaysDown],
            body: vec![Locomotion, CarHandle, FaceTracker, ImageHand, Idle, AlwaysDown],
        }
    }
}

impl PriorityTable {
    pub fn order(&self, target: Target) -> &[GeneratorKind] {
        match target {
            Target::LeftHand => &self.left_hand,
            Target::RightHand => &self.right_hand,
            Target::HeadLookAt => &self.head_look_at,
            Target::Body => &self.body,
        }
    }

    /// Position of `kind` in the target's order (0 = highest)
    pub fn rank(&self, target: Target, kind: GeneratorKind) -> Option<usize> {
        self.order(target).iter().position(|k| *k == kind)
    }

    pub fn accepts(&self, target: Target, kind: GeneratorKind) -> bool {
        self.rank(target, kind).is_some()
    }

    /// Highest-ranked candidate; unlisted candidates are ignored
    pub fn resolve(
        &self,
        target: Target,
        candidates: impl IntoIterator<Item = GeneratorKind>,
    ) -> Option<GeneratorKind> {
        candidates
            .into_iter()
            .filter_map(|kind| self.rank(target, kind).map(|rank| (rank, kind)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, kind)| kind)
    }

    /// Highest-ranked passive generator, optionally skipping idle sway
    pub fn fallback(&self, target: Target, allow_idle: bool) -> Option<GeneratorKind> {
        self.order(target)
            .iter()
            .copied()
            .find(|k| k.is_passive() && (allow_idle || *k != Idle))
    }

    pub fn validate(&self) -> KinemaResult<()> {
        for target in Target::ALL {
            let order = self.order(target);
            for (i, kind) in order.iter().enumerate() {
                if order[..i].contains(kind) {
                    return Err(KinemaError::InvalidConfig(format!(
                        "{kind} listed twice for {target}"
                    )));
                }
            }
            if !order.contains(&AlwaysDown) {
                return Err(KinemaError::InvalidConfig(format!(
                    "{target} priority must include always-down as last resort"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(PriorityTable::default().validate().is_ok());
    }

    #[test]
    fn test_keyboard_beats_mouse_beats_gamepad() {
        let table = PriorityTable::default();
        let t = Target::RightHand;
        assert_eq!(table.resolve(t, [Gamepad, Mouse, Typing]), Some(Typing));
        assert_eq!(table.resolve(t, [Gamepad, Mouse]), Some(Mouse));
        assert_eq!(table.resolve(t, [ImageHand, Gamepad]), Some(Gamepad));
        assert_eq!(table.resolve(t, [Idle, ImageHand]), Some(ImageHand));
    }

    #[test]
    fn test_resolve_is_order_independent() {
        let table = PriorityTable::default();
        let a = table.resolve(Target::Body, [FaceTracker, Locomotion]);
        let b = table.resolve(Target::Body, [Locomotion, FaceTracker]);
        assert_eq!(a, b);
        assert_eq!(a, Some(Locomotion));
    }

    #[test]
    fn test_unlisted_generator_rejected() {
        let table = PriorityTable::default();
        assert!(!table.accepts(Target::HeadLookAt, Typing));
        assert_eq!(table.resolve(Target::HeadLookAt, [Typing]), None);
    }

    #[test]
    fn test_fallback() {
        let table = PriorityTable::default();
        assert_eq!(table.fallback(Target::LeftHand, true), Some(Idle));
        assert_eq!(table.fallback(Target::LeftHand, false), Some(AlwaysDown));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_missing_last_resort() {
        let mut table = PriorityTable::default();
        table.body.push(Idle);
        assert!(table.validate().is_err());

        let mut table = PriorityTable::default();
        table.head_look_at.retain(|k| *k != AlwaysDown);
        assert!(table.validate().is_err());
    }
}
