//! Handheld controllers - gamepad and arcade stick

use glam::{Vec2, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{
    BodySuggestions, GamepadButton, GamepadStick, GeneratorKind, InputEvent, KinemaError,
    KinemaResult, LeanInput, LeanSource, Pose, RestPose, Target,
};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

use crate::admit;

const HANDS: [Target; 2] = [Target::LeftHand, Target::RightHand];

/// Gamepad configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GamepadConfig {
    /// Pad center relative to the chest
    pub grip_center: Vec3,
    /// Distance from the pad center to each grip
    pub grip_half_width: f32,
    /// Thumb travel at full stick deflection
    pub thumb_travel: f32,
    pub press_depth: f32,
    /// Stick magnitude below which input is ignored
    pub deadzone: f32,
    /// Lean at full deflection: (yaw from right stick x, pitch from left
    /// stick y, roll from left stick x), degrees
    pub lean_degrees: Vec3,
    pub smoothing: SmoothingParams,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            grip_center: Vec3::new(0.0, -0.28, 0.3),
            grip_half_width: 0.09,
            thumb_travel: 0.015,
            press_depth: 0.008,
            deadzone: 0.15,
            lean_degrees: Vec3::new(12.0, 8.0, 12.0),
            smoothing: SmoothingParams::responsive(),
        }
    }
}

impl GamepadConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(KinemaError::InvalidConfig(format!(
                "gamepad deadzone must be in [0, 1), got {}",
                self.deadzone
            )));
        }
        Ok(())
    }
}

/// Gamepad generator - both hands hold the pad, sticks also lean the body
pub struct GamepadGenerator {
    config: GamepadConfig,
    rest: RestPose,
    sticks: [Vec2; 2],
    held: Vec<GamepadButton>,
    hands: [SmoothedSignal<Vec3>; 2],
}

impl GamepadGenerator {
    pub fn new(config: GamepadConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            sticks: [Vec2::ZERO; 2],
            held: Vec::new(),
            hands: [
                SmoothedSignal::new(config.smoothing),
                SmoothedSignal::new(config.smoothing),
            ],
        }
    }

    fn stick_index(stick: GamepadStick) -> usize {
        match stick {
            GamepadStick::Left => 0,
            GamepadStick::Right => 1,
        }
    }

    /// Stick value with the deadzone applied
    pub fn stick(&self, stick: GamepadStick) -> Vec2 {
        let value = self.sticks[Self::stick_index(stick)];
        if value.length() < self.config.deadzone {
            Vec2::ZERO
        } else {
            value
        }
    }

    fn hand_goal(&self, hand: Target) -> Vec3 {
        let (side, stick) = match hand {
            Target::LeftHand => (-1.0, GamepadStick::Left),
            _ => (1.0, GamepadStick::Right),
        };
        let thumb = self.stick(stick) * self.config.thumb_travel;
        let pressed = self.held.iter().any(|b| b.hand() == hand);
        let press = if pressed { self.config.press_depth } else { 0.0 };
        self.rest.chest.position
            + self.config.grip_center
            + Vec3::new(side * self.config.grip_half_width + thumb.x, -press, thumb.y)
    }
}

impl PoseGenerator for GamepadGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Gamepad
    }

    fn targets(&self) -> &'static [Target] {
        &HANDS
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        let kind = GeneratorKind::Gamepad;
        match event {
            InputEvent::GamepadStick { stick, value } => {
                if !admit(kind, event.ensure_finite(kind)) {
                    return;
                }
                self.sticks[Self::stick_index(*stick)] = value.clamp_length_max(1.0);
                if self.stick(*stick) != Vec2::ZERO {
                    bus.publish_all(&HANDS, kind);
                }
            }
            InputEvent::GamepadButton { button, pressed } => {
                self.held.retain(|b| b != button);
                if *pressed {
                    self.held.push(*button);
                    bus.publish_all(&HANDS, kind);
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        for (i, hand) in HANDS.iter().enumerate() {
            let goal = self.hand_goal(*hand);
            self.hands[i].update(goal, dt);
        }
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        let i = HANDS.iter().position(|t| *t == target)?;
        let position = if self.hands[i].is_seeded() {
            self.hands[i].value()
        } else {
            self.hand_goal(target)
        };
        Some(Pose::new(position, self.rest.pose(target).rotation))
    }

    fn contribute(&self, suggestions: &mut BodySuggestions) {
        let left = self.stick(GamepadStick::Left);
        let right = self.stick(GamepadStick::Right);
        if left == Vec2::ZERO && right == Vec2::ZERO {
            return;
        }
        let lean = self.config.lean_degrees;
        suggestions.suggest(
            LeanSource::Gamepad,
            LeanInput::new(right.x * lean.x, left.y * lean.y, -left.x * lean.z),
        );
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.sticks = [Vec2::ZERO; 2];
        self.held.clear();
        for (i, hand) in HANDS.iter().enumerate() {
            let goal = self.hand_goal(*hand);
            self.hands[i].reset(goal);
        }
    }

    fn on_model_unloaded(&mut self) {
        self.sticks = [Vec2::ZERO; 2];
        self.held.clear();
        for hand in &mut self.hands {
            hand.clear();
        }
    }
}

/// Arcade stick configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcadeStickConfig {
    /// Lever ball relative to the chest (left hand)
    pub lever_center: Vec3,
    pub lever_travel: f32,
    /// Button 0 relative to the chest (right hand)
    pub button_origin: Vec3,
    pub button_spacing: f32,
    pub buttons_per_row: u8,
    pub press_depth: f32,
    pub smoothing: SmoothingParams,
}

impl Default for ArcadeStickConfig {
    fn default() -> Self {
        Self {
            lever_center: Vec3::new(-0.14, -0.26, 0.3),
            lever_travel: 0.04,
            button_origin: Vec3::new(0.06, -0.28, 0.32),
            button_spacing: 0.035,
            buttons_per_row: 4,
            press_depth: 0.01,
            smoothing: SmoothingParams::responsive(),
        }
    }
}

impl ArcadeStickConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if self.buttons_per_row == 0 {
            return Err(KinemaError::InvalidConfig(
                "arcade buttons_per_row must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Button position relative to the chest
    pub fn button_position(&self, index: u8) -> Vec3 {
        let row = (index / self.buttons_per_row) as f32;
        let col = (index % self.buttons_per_row) as f32;
        self.button_origin + Vec3::new(col * self.button_spacing, 0.0, -row * self.button_spacing)
    }
}

/// Arcade stick generator - left hand on the lever, right hand on the buttons
pub struct ArcadeStickGenerator {
    config: ArcadeStickConfig,
    rest: RestPose,
    lever: Vec2,
    button: u8,
    pressed: bool,
    left: SmoothedSignal<Vec3>,
    right: SmoothedSignal<Vec3>,
}

impl ArcadeStickGenerator {
    pub fn new(config: ArcadeStickConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            lever: Vec2::ZERO,
            button: 0,
            pressed: false,
            left: SmoothedSignal::new(config.smoothing),
            right: SmoothedSignal::new(config.smoothing),
        }
    }

    fn left_goal(&self) -> Vec3 {
        let lever = self.lever * self.config.lever_travel;
        self.rest.chest.position + self.config.lever_center + Vec3::new(lever.x, 0.0, lever.y)
    }

    fn right_goal(&self) -> Vec3 {
        let press = if self.pressed { self.config.press_depth } else { 0.0 };
        self.rest.chest.position + self.config.button_position(self.button) - Vec3::Y * press
    }
}

impl PoseGenerator for ArcadeStickGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::ArcadeStick
    }

    fn targets(&self) -> &'static [Target] {
        &HANDS
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        let kind = GeneratorKind::ArcadeStick;
        match event {
            InputEvent::ArcadeStick { value } => {
                if !admit(kind, event.ensure_finite(kind)) {
                    return;
                }
                self.lever = value.clamp(Vec2::NEG_ONE, Vec2::ONE);
                bus.publish(Target::LeftHand, kind);
            }
            InputEvent::ArcadeButton { index, pressed } => {
                if *pressed {
                    self.button = *index;
                    self.pressed = true;
                    bus.publish(Target::RightHand, kind);
                } else if *index == self.button {
                    self.pressed = false;
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        let (left, right) = (self.left_goal(), self.right_goal());
        self.left.update(left, dt);
        self.right.update(right, dt);
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        let (signal, goal) = match target {
            Target::LeftHand => (&self.left, self.left_goal()),
            Target::RightHand => (&self.right, self.right_goal()),
            _ => return None,
        };
        let position = if signal.is_seeded() { signal.value() } else { goal };
        Some(Pose::new(position, self.rest.pose(target).rotation))
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.lever = Vec2::ZERO;
        self.pressed = false;
        self.left.reset(self.left_goal());
        self.right.reset(self.right_goal());
    }

    fn on_model_unloaded(&mut self) {
        self.lever = Vec2::ZERO;
        self.pressed = false;
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_deadzone_suppresses_requests() {
        let mut pad = GamepadGenerator::new(GamepadConfig::default());
        let mut bus = RequestBus::new();
        pad.handle_event(
            &InputEvent::GamepadStick {
                stick: GamepadStick::Left,
                value: Vec2::new(0.05, 0.0),
            },
            &mut bus,
        );
        assert!(bus.is_empty());

        pad.handle_event(
            &InputEvent::GamepadStick {
                stick: GamepadStick::Left,
                value: Vec2::new(0.8, 0.0),
            },
            &mut bus,
        );
        assert_eq!(bus.drain().len(), 2);
    }

    #[test]
    fn test_left_stick_leans_body() {
        let mut pad = GamepadGenerator::new(GamepadConfig::default());
        let mut bus = RequestBus::new();
        let mut suggestions = BodySuggestions::new();
        pad.contribute(&mut suggestions);
        assert!(suggestions.lean(LeanSource::Gamepad).is_none());

        pad.handle_event(
            &InputEvent::GamepadStick {
                stick: GamepadStick::Left,
                value: Vec2::new(1.0, 0.0),
            },
            &mut bus,
        );
        pad.contribute(&mut suggestions);
        let lean = suggestions.lean(LeanSource::Gamepad).unwrap();
        assert_eq!(lean.roll, -12.0);
        assert_eq!(lean.yaw, 0.0);
    }

    #[test]
    fn test_button_press_lowers_its_hand() {
        let mut pad = GamepadGenerator::new(GamepadConfig::default());
        pad.on_model_loaded(&RestPose::default());
        let mut bus = RequestBus::new();
        let before = pad.pose(Target::LeftHand).unwrap().position;
        pad.handle_event(
            &InputEvent::GamepadButton {
                button: GamepadButton::LeftShoulder,
                pressed: true,
            },
            &mut bus,
        );
        for _ in 0..120 {
            pad.tick(1.0 / 60.0, &mut bus);
        }
        let after = pad.pose(Target::LeftHand).unwrap().position;
        assert!((before.y - after.y - 0.008).abs() < 0.001);
    }

    #[test]
    fn test_nan_stick_is_dropped() {
        let mut pad = GamepadGenerator::new(GamepadConfig::default());
        let mut bus = RequestBus::new();
        pad.handle_event(
            &InputEvent::GamepadStick {
                stick: GamepadStick::Right,
                value: Vec2::new(f32::NAN, 1.0),
            },
            &mut bus,
        );
        assert!(bus.is_empty());
        assert_eq!(pad.stick(GamepadStick::Right), Vec2::ZERO);
    }

    #[test]
    fn test_arcade_hands_are_independent() {
        let mut arcade = ArcadeStickGenerator::new(ArcadeStickConfig::default());
        let mut bus = RequestBus::new();
        arcade.handle_event(&InputEvent::ArcadeStick { value: Vec2::X }, &mut bus);
        arcade.handle_event(
            &InputEvent::ArcadeButton {
                index: 5,
                pressed: true,
            },
            &mut bus,
        );
        let targets: Vec<Target> = bus.drain().iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![Target::LeftHand, Target::RightHand]);

        let config = ArcadeStickConfig::default();
        let expected = config.button_position(5) + RestPose::default().chest.position
            - Vec3::Y * config.press_depth;
        let right = arcade.pose(Target::RightHand).unwrap().position;
        assert!(right.distance(expected) < 1e-5);
    }
}
