//! Pointer generators - mouse and presentation pointer
//!
//! Both drive the right hand and the head look-at from a normalized screen
//! position. The mouse keeps the hand on a desk pad; the presentation
//! pointer extends the arm toward a virtual screen in front of the avatar.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{GeneratorKind, InputEvent, KinemaError, KinemaResult, Pose, RestPose, Target};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

use crate::admit;

const POINTER_TARGETS: [Target; 2] = [Target::RightHand, Target::HeadLookAt];

/// Mouse configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseConfig {
    /// Mouse pad center relative to the chest
    pub pad_center: Vec3,
    /// Hand travel for a full screen sweep, (x, z)
    pub reach: Vec2,
    /// Look-at displacement for a full screen sweep, (x, y)
    pub look_range: Vec2,
    /// Hand drop while a button is held
    pub press_depth: f32,
    pub smoothing: SmoothingParams,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            pad_center: Vec3::new(0.24, -0.32, 0.3),
            reach: Vec2::new(0.1, 0.07),
            look_range: Vec2::new(0.5, 0.3),
            press_depth: 0.008,
            smoothing: SmoothingParams::responsive(),
        }
    }
}

impl MouseConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.reach.is_finite() && self.look_range.is_finite() && self.press_depth >= 0.0) {
            return Err(KinemaError::InvalidConfig("invalid mouse ranges".into()));
        }
        Ok(())
    }
}

/// Mouse generator
pub struct MouseGenerator {
    config: MouseConfig,
    rest: RestPose,
    cursor: Vec2,
    pressed: bool,
    hand: SmoothedSignal<Vec3>,
    look: SmoothedSignal<Vec3>,
}

impl MouseGenerator {
    pub fn new(config: MouseConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            cursor: Vec2::ZERO,
            pressed: false,
            hand: SmoothedSignal::new(config.smoothing),
            look: SmoothedSignal::new(config.smoothing),
        }
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    fn hand_goal(&self) -> Vec3 {
        let press = if self.pressed { self.config.press_depth } else { 0.0 };
        self.rest.chest.position
            + self.config.pad_center
            + Vec3::new(
                self.cursor.x * self.config.reach.x,
                -press,
                self.cursor.y * self.config.reach.y,
            )
    }

    fn look_goal(&self) -> Vec3 {
        let range = self.config.look_range;
        self.rest.look_ahead().position + Vec3::new(self.cursor.x * range.x, self.cursor.y * range.y, 0.0)
    }
}

impl PoseGenerator for MouseGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Mouse
    }

    fn targets(&self) -> &'static [Target] {
        &POINTER_TARGETS
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        match event {
            InputEvent::MouseMoved { position } => {
                if !admit(GeneratorKind::Mouse, event.ensure_finite(GeneratorKind::Mouse)) {
                    return;
                }
                self.cursor = position.clamp(Vec2::NEG_ONE, Vec2::ONE);
                bus.publish_all(&POINTER_TARGETS, GeneratorKind::Mouse);
            }
            InputEvent::MouseButton { pressed, .. } => {
                self.pressed = *pressed;
                if *pressed {
                    bus.publish(Target::RightHand, GeneratorKind::Mouse);
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        let (hand, look) = (self.hand_goal(), self.look_goal());
        self.hand.update(hand, dt);
        self.look.update(look, dt);
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        match target {
            Target::RightHand => {
                let position = if self.hand.is_seeded() {
                    self.hand.value()
                } else {
                    self.hand_goal()
                };
                let rotation = self.rest.right_hand.rotation * Quat::from_rotation_x(FRAC_PI_2);
                Some(Pose::new(position, rotation))
            }
            Target::HeadLookAt => Some(Pose::from_position(if self.look.is_seeded() {
                self.look.value()
            } else {
                self.look_goal()
            })),
            _ => None,
        }
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.cursor = Vec2::ZERO;
        self.pressed = false;
        self.hand.reset(self.hand_goal());
        self.look.reset(self.look_goal());
    }

    fn on_model_unloaded(&mut self) {
        self.cursor = Vec2::ZERO;
        self.pressed = false;
        self.hand.clear();
        self.look.clear();
    }
}

/// Presentation pointer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Shoulder height above the chest
    pub shoulder_lift: f32,
    pub arm_length: f32,
    /// Distance to the virtual screen
    pub screen_distance: f32,
    /// Half width/height of the virtual screen
    pub screen_half_extent: Vec2,
    pub smoothing: SmoothingParams,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            shoulder_lift: 0.15,
            arm_length: 0.55,
            screen_distance: 2.0,
            screen_half_extent: Vec2::new(1.2, 0.7),
            smoothing: SmoothingParams::default(),
        }
    }
}

impl PresentationConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.arm_length > 0.0 && self.screen_distance > 0.0) {
            return Err(KinemaError::InvalidConfig(
                "presentation arm_length and screen_distance must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Presentation pointer generator
pub struct PresentationGenerator {
    config: PresentationConfig,
    rest: RestPose,
    pointer: Vec2,
    hand: SmoothedSignal<Vec3>,
    look: SmoothedSignal<Vec3>,
}

impl PresentationGenerator {
    pub fn new(config: PresentationConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            pointer: Vec2::ZERO,
            hand: SmoothedSignal::new(config.smoothing),
            look: SmoothedSignal::new(config.smoothing),
        }
    }

    /// Pointed-at point on the virtual screen
    pub fn screen_point(&self) -> Vec3 {
        let extent = self.config.screen_half_extent;
        self.rest.head.position
            + Vec3::new(
                self.pointer.x * extent.x,
                self.pointer.y * extent.y,
                self.config.screen_distance,
            )
    }

    fn shoulder(&self) -> Vec3 {
        self.rest.chest.position
            + Vec3::new(self.rest.shoulder_width() * 0.5, self.config.shoulder_lift, 0.0)
    }

    fn arm_direction(&self) -> Vec3 {
        (self.screen_point() - self.shoulder()).normalize_or_zero()
    }

    fn hand_goal(&self) -> Vec3 {
        self.shoulder() + self.arm_direction() * self.config.arm_length
    }
}

impl PoseGenerator for PresentationGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Presentation
    }

    fn targets(&self) -> &'static [Target] {
        &POINTER_TARGETS
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        if let InputEvent::PresentationPointer { position } = event {
            let kind = GeneratorKind::Presentation;
            if !admit(kind, event.ensure_finite(kind)) {
                return;
            }
            self.pointer = position.clamp(Vec2::NEG_ONE, Vec2::ONE);
            bus.publish_all(&POINTER_TARGETS, kind);
        }
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        let (hand, look) = (self.hand_goal(), self.screen_point());
        self.hand.update(hand, dt);
        self.look.update(look, dt);
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        match target {
            Target::RightHand => {
                let position = if self.hand.is_seeded() {
                    self.hand.value()
                } else {
                    self.hand_goal()
                };
                let rotation = Quat::from_rotation_arc(Vec3::Z, self.arm_direction());
                Some(Pose::new(position, rotation))
            }
            Target::HeadLookAt => Some(Pose::from_position(if self.look.is_seeded() {
                self.look.value()
            } else {
                self.screen_point()
            })),
            _ => None,
        }
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.pointer = Vec2::ZERO;
        self.hand.reset(self.hand_goal());
        self.look.reset(self.screen_point());
    }

    fn on_model_unloaded(&mut self) {
        self.pointer = Vec2::ZERO;
        self.hand.clear();
        self.look.clear();
    }
}
