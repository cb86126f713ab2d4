//! Locomotion generator - walk cycle driven by movement keys or the left stick
//!
//! Only reachable in `GameInputLocomotion` mode, where it is forced onto
//! the hands and body and competes normally for the head.

use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{
    GamepadStick, GeneratorKind, InputEvent, KinemaError, KinemaResult, Pose, RestPose, Target,
};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

use crate::admit;

/// Locomotion configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocomotionConfig {
    /// Walk cycles per second at full speed
    pub stride_frequency: f32,
    /// Forward/back hand swing at full speed, meters
    pub arm_swing: f32,
    /// Vertical body bob at full speed, meters
    pub body_bob: f32,
    /// Body yaw at full sideways input, degrees
    pub max_turn_degrees: f32,
    /// Look-at shift at full sideways input, meters
    pub look_shift: f32,
    pub smoothing: SmoothingParams,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            stride_frequency: 1.8,
            arm_swing: 0.12,
            body_bob: 0.02,
            max_turn_degrees: 25.0,
            look_shift: 0.3,
            smoothing: SmoothingParams::default(),
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.stride_frequency > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "stride_frequency must be positive, got {}",
                self.stride_frequency
            )));
        }
        Ok(())
    }
}

/// Movement direction of a key, (x right, y forward)
fn key_direction(key: &str) -> Option<Vec2> {
    match key.to_ascii_lowercase().as_str() {
        "w" | "up" => Some(Vec2::Y),
        "s" | "down" => Some(Vec2::NEG_Y),
        "a" | "left" => Some(Vec2::NEG_X),
        "d" | "right" => Some(Vec2::X),
        _ => None,
    }
}

/// Locomotion generator
pub struct LocomotionGenerator {
    config: LocomotionConfig,
    rest: RestPose,
    held: Vec<Vec2>,
    stick: Vec2,
    velocity: SmoothedSignal<Vec2>,
    phase: f32,
}

impl LocomotionGenerator {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            held: Vec::new(),
            stick: Vec2::ZERO,
            velocity: SmoothedSignal::with_value(config.smoothing, Vec2::ZERO),
            phase: 0.0,
        }
    }

    /// Requested movement, length at most 1
    pub fn input(&self) -> Vec2 {
        let keys: Vec2 = self.held.iter().copied().sum();
        (keys + self.stick).clamp_length_max(1.0)
    }

    /// Smoothed movement
    pub fn velocity(&self) -> Vec2 {
        self.velocity.value()
    }

    fn speed(&self) -> f32 {
        self.velocity().length().min(1.0)
    }

    fn swing(&self) -> f32 {
        (TAU * self.phase).sin() * self.speed()
    }

    fn announce(&self, was_moving: bool, bus: &mut RequestBus) {
        if !was_moving && self.input() != Vec2::ZERO {
            bus.publish_all(&Target::ALL, GeneratorKind::Locomotion);
        }
    }
}

impl PoseGenerator for LocomotionGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Locomotion
    }

    fn targets(&self) -> &'static [Target] {
        &Target::ALL
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        let was_moving = self.input() != Vec2::ZERO;
        match event {
            InputEvent::KeyDown { key } => {
                let Some(direction) = key_direction(key) else {
                    return;
                };
                if !self.held.contains(&direction) {
                    self.held.push(direction);
                }
            }
            InputEvent::KeyUp { key } => {
                if let Some(direction) = key_direction(key) {
                    self.held.retain(|d| *d != direction);
                }
            }
            InputEvent::GamepadStick {
                stick: GamepadStick::Left,
                value,
            } => {
                if !admit(GeneratorKind::Locomotion, event.ensure_finite(GeneratorKind::Locomotion)) {
                    return;
                }
                self.stick = value.clamp_length_max(1.0);
            }
            _ => return,
        }
        self.announce(was_moving, bus);
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        self.velocity.update(self.input(), dt);
        let step = dt.max(0.0) * self.config.stride_frequency * self.speed();
        self.phase = (self.phase + step).fract();
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        let rest = self.rest.pose(target);
        let c = &self.config;
        let velocity = self.velocity();
        let pose = match target {
            Target::LeftHand => rest.transformed(Vec3::Z * self.swing() * c.arm_swing, Quat::IDENTITY),
            Target::RightHand => {
                rest.transformed(Vec3::Z * -self.swing() * c.arm_swing, Quat::IDENTITY)
            }
            Target::HeadLookAt => {
                rest.transformed(Vec3::X * velocity.x * c.look_shift, Quat::IDENTITY)
            }
            Target::Body => {
                let bob = (TAU * self.phase * 2.0).sin().abs() * self.speed() * c.body_bob;
                let turn = Quat::from_rotation_y((velocity.x * c.max_turn_degrees).to_radians());
                rest.transformed(Vec3::Y * bob, turn)
            }
        };
        Some(pose)
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.held.clear();
        self.stick = Vec2::ZERO;
        self.velocity.reset(Vec2::ZERO);
        self.phase = 0.0;
    }

    fn on_model_unloaded(&mut self) {
        self.held.clear();
        self.stick = Vec2::ZERO;
        self.velocity.reset(Vec2::ZERO);
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: &str, down: bool) -> InputEvent {
        if down {
            InputEvent::KeyDown { key: key.into() }
        } else {
            InputEvent::KeyUp { key: key.into() }
        }
    }

    #[test]
    fn test_movement_start_publishes_once() {
        let mut walk = LocomotionGenerator::new(LocomotionConfig::default());
        let mut bus = RequestBus::new();
        walk.handle_event(&key("w", true), &mut bus);
        walk.handle_event(&key("d", true), &mut bus);
        assert_eq!(bus.drain().len(), Target::COUNT);
        assert!((walk.input().length() - 1.0).abs() < 1e-6);

        walk.handle_event(&key("w", false), &mut bus);
        walk.handle_event(&key("d", false), &mut bus);
        assert_eq!(walk.input(), Vec2::ZERO);
        walk.handle_event(&key("x", true), &mut bus);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_walking_swings_arms_in_opposition() {
        let mut walk = LocomotionGenerator::new(LocomotionConfig::default());
        walk.on_model_loaded(&RestPose::default());
        let mut bus = RequestBus::new();
        walk.handle_event(
            &InputEvent::GamepadStick {
                stick: GamepadStick::Left,
                value: Vec2::Y,
            },
            &mut bus,
        );
        let rest = RestPose::default();
        let mut max_swing: f32 = 0.0;
        for _ in 0..240 {
            walk.tick(1.0 / 60.0, &mut bus);
            let left = walk.pose(Target::LeftHand).unwrap().position.z - rest.left_hand.position.z;
            let right = walk.pose(Target::RightHand).unwrap().position.z - rest.right_hand.position.z;
            assert!((left + right).abs() < 1e-5);
            max_swing = max_swing.max(left.abs());
        }
        assert!(max_swing > 0.05);
    }

    #[test]
    fn test_standing_still_is_rest() {
        let walk = LocomotionGenerator::new(LocomotionConfig::default());
        let rest = RestPose::default();
        for target in Target::ALL {
            assert!(walk.pose(target).unwrap().abs_diff_eq(&rest.pose(target), 1e-6));
        }
    }
}
