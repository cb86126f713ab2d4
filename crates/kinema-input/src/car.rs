//! Car handle generator - hands on a steering wheel, body rolls into turns

use glam::{Quat, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{GeneratorKind, InputEvent, KinemaError, KinemaResult, Pose, RestPose, Target};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

use crate::admit;

const CAR_TARGETS: [Target; 3] = [Target::LeftHand, Target::RightHand, Target::Body];

/// Car handle configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarHandleConfig {
    /// Wheel center relative to the chest
    pub wheel_center: Vec3,
    pub wheel_radius: f32,
    /// Steering lock in degrees either way
    pub max_angle_degrees: f32,
    /// Body roll per degree of steering
    pub body_roll_per_degree: f32,
    pub max_body_roll_degrees: f32,
    pub smoothing: SmoothingParams,
}

impl Default for CarHandleConfig {
    fn default() -> Self {
        Self {
            wheel_center: Vec3::new(0.0, -0.18, 0.38),
            wheel_radius: 0.17,
            max_angle_degrees: 450.0,
            body_roll_per_degree: 0.04,
            max_body_roll_degrees: 8.0,
            smoothing: SmoothingParams::responsive(),
        }
    }
}

impl CarHandleConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.wheel_radius > 0.0 && self.max_angle_degrees > 0.0) {
            return Err(KinemaError::InvalidConfig(
                "car handle wheel_radius and max_angle_degrees must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Car handle generator
pub struct CarHandleGenerator {
    config: CarHandleConfig,
    rest: RestPose,
    requested: f32,
    angle: SmoothedSignal<f32>,
}

impl CarHandleGenerator {
    pub fn new(config: CarHandleConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            requested: 0.0,
            angle: SmoothedSignal::with_value(config.smoothing, 0.0),
        }
    }

    /// Smoothed steering angle in degrees
    pub fn angle(&self) -> f32 {
        self.angle.value()
    }

    fn grip(&self, target: Target) -> Pose {
        let steer = self.angle().to_radians();
        // Clockwise from the driver's view for positive (right) steering
        let base = if target == Target::LeftHand {
            std::f32::consts::PI
        } else {
            0.0
        };
        let theta = base - steer;
        let center = self.rest.chest.position + self.config.wheel_center;
        let position = center + self.config.wheel_radius * Vec3::new(theta.cos(), theta.sin(), 0.0);
        Pose::new(position, self.rest.pose(target).rotation * Quat::from_rotation_z(-steer))
    }

    fn body(&self) -> Pose {
        let max = self.config.max_body_roll_degrees;
        let roll = (self.angle() * self.config.body_roll_per_degree).clamp(-max, max);
        let hips = self.rest.hips;
        Pose::new(hips.position, hips.rotation * Quat::from_rotation_z(-roll.to_radians()))
    }
}

impl PoseGenerator for CarHandleGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::CarHandle
    }

    fn targets(&self) -> &'static [Target] {
        &CAR_TARGETS
    }

    fn handle_event(&mut self, event: &InputEvent, bus: &mut RequestBus) {
        if let InputEvent::CarHandle { angle_degrees } = event {
            let kind = GeneratorKind::CarHandle;
            if !admit(kind, event.ensure_finite(kind)) {
                return;
            }
            let max = self.config.max_angle_degrees;
            self.requested = angle_degrees.clamp(-max, max);
            bus.publish_all(&CAR_TARGETS, kind);
        }
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        self.angle.update(self.requested, dt);
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        match target {
            Target::LeftHand | Target::RightHand => Some(self.grip(target)),
            Target::Body => Some(self.body()),
            Target::HeadLookAt => None,
        }
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.requested = 0.0;
        self.angle.reset(0.0);
    }

    fn on_model_unloaded(&mut self) {
        self.requested = 0.0;
        self.angle.reset(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_grips_are_level() {
        let car = CarHandleGenerator::new(CarHandleConfig::default());
        let left = car.pose(Target::LeftHand).unwrap().position;
        let right = car.pose(Target::RightHand).unwrap().position;
        assert!((left.y - right.y).abs() < 1e-5);
        assert!((right.x - left.x - 0.34).abs() < 1e-5);
        assert!(car.pose(Target::HeadLookAt).is_none());
    }

    #[test]
    fn test_steering_right_raises_left_grip() {
        let mut car = CarHandleGenerator::new(CarHandleConfig::default());
        let mut bus = RequestBus::new();
        car.handle_event(&InputEvent::CarHandle { angle_degrees: 45.0 }, &mut bus);
        assert_eq!(bus.drain().len(), 3);
        for _ in 0..180 {
            car.tick(1.0 / 60.0, &mut bus);
        }
        assert!((car.angle() - 45.0).abs() < 0.5);
        let left = car.pose(Target::LeftHand).unwrap().position;
        let right = car.pose(Target::RightHand).unwrap().position;
        assert!(left.y > right.y);
    }

    #[test]
    fn test_angle_clamped_and_nan_dropped() {
        let mut car = CarHandleGenerator::new(CarHandleConfig::default());
        let mut bus = RequestBus::new();
        car.handle_event(&InputEvent::CarHandle { angle_degrees: 9000.0 }, &mut bus);
        assert_eq!(car.requested, 450.0);
        car.handle_event(
            &InputEvent::CarHandle {
                angle_degrees: f32::NAN,
            },
            &mut bus,
        );
        assert_eq!(car.requested, 450.0);
        assert_eq!(bus.drain().len(), 3);
    }
}
