//! Typing generator - hands hover over the keyboard and reach for pressed keys

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{GeneratorKind, InputEvent, KinemaError, KinemaResult, Pose, RestPose, Target};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

/// Character rows from the far (number) row to the near row
const ROWS: [&str; 4] = ["1234567890-=", "qwertyuiop[]", "asdfghjkl;'", "zxcvbnm,./"];

/// Horizontal row offsets in key widths
const ROW_STAGGER: [f32; 4] = [0.0, 0.5, 0.75, 1.25];

/// Columns below this (after stagger) are typed with the left hand
const SPLIT_COLUMN: f32 = 5.5;

/// Typing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Keyboard center relative to the chest, meters
    pub keyboard_center: Vec3,
    /// Key spacing in meters
    pub key_pitch: f32,
    /// Height of the hand above the keys while not pressing
    pub hover_height: f32,
    pub smoothing: SmoothingParams,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            keyboard_center: Vec3::new(0.0, -0.32, 0.32),
            key_pitch: 0.019,
            hover_height: 0.03,
            smoothing: SmoothingParams::responsive(),
        }
    }
}

impl TypingConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.key_pitch > 0.0 && self.hover_height >= 0.0) {
            return Err(KinemaError::InvalidConfig(
                "typing key_pitch must be positive and hover_height non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Hand and keyboard-relative position of a key, `None` if unmapped
    pub fn key_location(&self, key: &str) -> Option<(Target, Vec3)> {
        let key = key.to_ascii_lowercase();
        let p = self.key_pitch;
        let special = match key.as_str() {
            "space" | " " => Some((Target::RightHand, Vec3::new(p, 0.0, -2.5 * p))),
            "enter" | "return" => Some((Target::RightHand, Vec3::new(7.0 * p, 0.0, -0.5 * p))),
            "backspace" => Some((Target::RightHand, Vec3::new(7.5 * p, 0.0, 1.5 * p))),
            "tab" => Some((Target::LeftHand, Vec3::new(-6.5 * p, 0.0, 0.5 * p))),
            "shift" | "lshift" => Some((Target::LeftHand, Vec3::new(-6.0 * p, 0.0, -1.5 * p))),
            "rshift" => Some((Target::RightHand, Vec3::new(6.5 * p, 0.0, -1.5 * p))),
            "escape" | "esc" => Some((Target::LeftHand, Vec3::new(-6.0 * p, 0.0, 2.5 * p))),
            _ => None,
        };
        if special.is_some() {
            return special;
        }

        let mut chars = key.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        ROWS.iter().enumerate().find_map(|(row, keys)| {
            let col = keys.chars().position(|k| k == c)? as f32 + ROW_STAGGER[row];
            let hand = if col < SPLIT_COLUMN {
                Target::LeftHand
            } else {
                Target::RightHand
            };
            let offset = Vec3::new((col - SPLIT_COLUMN) * p, 0.0, (1.5 - row as f32) * p);
            Some((hand, offset))
        })
    }

    /// Home-row rest key for a hand
    fn home(&self, hand: Target) -> Vec3 {
        let key = if hand == Target::LeftHand { "f" } else { "j" };
        self.key_location(key)
            .map(|(_, position)| position)
            .unwrap_or(Vec3::ZERO)
    }
}

#[derive(Debug, Clone)]
struct TypingHand {
    goal: Vec3,
    pressed: Option<String>,
    position: SmoothedSignal<Vec3>,
}

/// Typing generator
pub struct TypingGenerator {
    config: TypingConfig,
    rest: RestPose,
    hands: [TypingHand; 2],
}

impl TypingGenerator {
    pub fn new(config: TypingConfig) -> Self {
        let hand = |target| TypingHand {
            goal: config.home(target),
            pressed: None,
            position: SmoothedSignal::new(config.smoothing),
        };
        Self {
            config,
            rest: RestPose::default(),
            hands: [hand(Target::LeftHand), hand(Target::RightHand)],
        }
    }

    fn keyboard_origin(&self) -> Vec3 {
        self.rest.chest.position + self.config.keyboard_center
    }

    fn goal_position(&self, hand: &TypingHand) -> Vec3 {
        let lift = if hand.pressed.is_some() {
            0.0
        } else {
            self.config.hover_height
        };
        self.keyboard_origin() + hand.goal + Vec3::Y * lift
    }

    fn palm_down(&self, target: Target) -> Quat {
        self.rest.pose(target).rotation * Quat::from_rotation_x(FRAC_PI_2)
    }

    /// Key currently held by a hand
    pub fn pressed_key(&self, target: Target) -> Option<&str> {
        let hand = self.hands.get(target.index())?;
        hand.pressed.as_deref()
    }
}

impl PoseGenerator for TypingGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Typing
    }

    fn targets(&self) -> &'static [Target] {
        &[Target::LeftHand, Target::RightHand]
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        match event {
            InputEvent::KeyDown { key } => {
                let Some((target, goal)) = self.config.key_location(key) else {
                    return;
                };
                let hand = &mut self.hands[target.index()];
                hand.goal = goal;
                hand.pressed = Some(key.to_ascii_lowercase());
                bus.publish(target, GeneratorKind::Typing);
            }
            InputEvent::KeyUp { key } => {
                let key = key.to_ascii_lowercase();
                for hand in &mut self.hands {
                    if hand.pressed.as_deref() == Some(key.as_str()) {
                        hand.pressed = None;
                    }
                }
            }
            _ => {}
        }
    }

    fn is_holding(&self, target: Target) -> bool {
        self.pressed_key(target).is_some()
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        let goals = [
            self.goal_position(&self.hands[0]),
            self.goal_position(&self.hands[1]),
        ];
        for (hand, goal) in self.hands.iter_mut().zip(goals) {
            hand.position.update(goal, dt);
        }
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        let hand = self.hands.get(target.index()).filter(|_| target.is_hand())?;
        let position = if hand.position.is_seeded() {
            hand.position.value()
        } else {
            self.goal_position(hand)
        };
        Some(Pose::new(position, self.palm_down(target)))
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        for target in [Target::LeftHand, Target::RightHand] {
            let home = self.config.home(target);
            let hand = &mut self.hands[target.index()];
            hand.goal = home;
            hand.pressed = None;
        }
        for i in 0..self.hands.len() {
            let goal = self.goal_position(&self.hands[i]);
            self.hands[i].position.reset(goal);
        }
    }

    fn on_model_unloaded(&mut self) {
        for (i, hand) in self.hands.iter_mut().enumerate() {
            let target = if i == 0 {
                Target::LeftHand
            } else {
                Target::RightHand
            };
            hand.goal = self.config.home(target);
            hand.pressed = None;
            hand.position.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: &str) -> InputEvent {
        InputEvent::KeyDown { key: key.into() }
    }

    #[test]
    fn test_key_layout_split() {
        let config = TypingConfig::default();
        assert_eq!(config.key_location("a").unwrap().0, Target::LeftHand);
        assert_eq!(config.key_location("F").unwrap().0, Target::LeftHand);
        assert_eq!(config.key_location("j").unwrap().0, Target::RightHand);
        assert_eq!(config.key_location("p").unwrap().0, Target::RightHand);
        assert_eq!(config.key_location("Enter").unwrap().0, Target::RightHand);
        assert!(config.key_location("F13").is_none());
    }

    #[test]
    fn test_far_rows_are_forward() {
        let config = TypingConfig::default();
        let (_, one) = config.key_location("1").unwrap();
        let (_, z) = config.key_location("z").unwrap();
        assert!(one.z > z.z);
    }

    #[test]
    fn test_key_down_publishes_pressing_hand() {
        let mut generator = TypingGenerator::new(TypingConfig::default());
        let mut bus = RequestBus::new();
        generator.handle_event(&key_down("k"), &mut bus);
        generator.handle_event(&key_down("unmapped-key"), &mut bus);

        let requests = bus.drain();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, Target::RightHand);
        assert_eq!(requests[0].generator, GeneratorKind::Typing);
        assert_eq!(generator.pressed_key(Target::RightHand), Some("k"));
        assert!(generator.is_holding(Target::RightHand));
        assert!(!generator.is_holding(Target::LeftHand));

        generator.handle_event(&InputEvent::KeyUp { key: "K".into() }, &mut bus);
        assert_eq!(generator.pressed_key(Target::RightHand), None);
        assert!(!generator.is_holding(Target::RightHand));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_hand_moves_toward_pressed_key() {
        let mut generator = TypingGenerator::new(TypingConfig::default());
        generator.on_model_loaded(&RestPose::default());
        let mut bus = RequestBus::new();
        let start = generator.pose(Target::LeftHand).unwrap();

        generator.handle_event(&key_down("q"), &mut bus);
        for _ in 0..120 {
            generator.tick(1.0 / 60.0, &mut bus);
        }
        let end = generator.pose(Target::LeftHand).unwrap();
        let (_, q) = TypingConfig::default().key_location("q").unwrap();
        let expected = generator.keyboard_origin() + q;
        assert!(end.position.distance(expected) < 0.005);
        assert!(end.position.distance(start.position) > 0.02);
        assert!(generator.pose(Target::Body).is_none());
    }
}
