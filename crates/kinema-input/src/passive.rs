//! Passive generators - idle sway and always-down
//!
//! Neither publishes ownership requests. The controller assigns them as a
//! target's fallback when nothing active claims it.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{GeneratorKind, KinemaError, KinemaResult, Pose, RestPose, Target};
use serde::{Deserialize, Serialize};

/// Idle sway configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleSwayConfig {
    /// When disabled, targets fall back to always-down instead
    pub enabled: bool,
    /// Seconds per breathing cycle
    pub period: f32,
    pub hand_amplitude: f32,
    pub head_amplitude: f32,
    pub body_amplitude: f32,
}

impl Default for IdleSwayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: 4.0,
            hand_amplitude: 0.012,
            head_amplitude: 0.04,
            body_amplitude: 0.004,
        }
    }
}

impl IdleSwayConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "idle period must be positive, got {}",
                self.period
            )));
        }
        Ok(())
    }
}

/// Slow breathing motion around the rest pose
pub struct IdleSwayGenerator {
    config: IdleSwayConfig,
    rest: RestPose,
    time: f32,
}

impl IdleSwayGenerator {
    pub fn new(config: IdleSwayConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            time: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn phase(&self) -> f32 {
        TAU * self.time / self.config.period
    }
}

impl PoseGenerator for IdleSwayGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Idle
    }

    fn targets(&self) -> &'static [Target] {
        &Target::ALL
    }

    fn tick(&mut self, dt: f32, _bus: &mut RequestBus) {
        // The head sways at half rate, so wrap over two cycles
        self.time = (self.time + dt.max(0.0)) % (2.0 * self.config.period);
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        let phase = self.phase();
        let c = &self.config;
        let rest = self.rest.pose(target);
        let offset = match target {
            Target::LeftHand => Vec3::Y * phase.sin() * c.hand_amplitude,
            Target::RightHand => Vec3::Y * (phase + FRAC_PI_2).sin() * c.hand_amplitude,
            Target::HeadLookAt => Vec3::X * (phase * 0.5).sin() * c.head_amplitude,
            Target::Body => Vec3::Y * phase.sin() * c.body_amplitude,
        };
        Some(Pose::new(rest.position + offset, rest.rotation))
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.time = 0.0;
    }

    fn on_model_unloaded(&mut self) {
        self.time = 0.0;
    }
}

/// Arms hanging straight down, head looking ahead
pub struct AlwaysDownGenerator {
    rest: RestPose,
}

impl AlwaysDownGenerator {
    /// Shoulder height above the chest
    const SHOULDER_LIFT: f32 = 0.12;

    pub fn new() -> Self {
        Self {
            rest: RestPose::default(),
        }
    }

    fn hanging(&self, target: Target) -> Pose {
        let side = if target == Target::LeftHand { -1.0 } else { 1.0 };
        let hand = self.rest.pose(target);
        let shoulder = self.rest.chest.position
            + Vec3::new(side * self.rest.shoulder_width() * 0.5, Self::SHOULDER_LIFT, 0.0);
        let arm_length = shoulder.distance(hand.position);
        Pose::new(shoulder - Vec3::Y * arm_length, hand.rotation)
    }
}

impl Default for AlwaysDownGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseGenerator for AlwaysDownGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::AlwaysDown
    }

    fn targets(&self) -> &'static [Target] {
        &Target::ALL
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        Some(match target {
            Target::LeftHand | Target::RightHand => self.hanging(target),
            _ => self.rest.pose(target),
        })
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_sway_stays_near_rest() {
        let mut idle = IdleSwayGenerator::new(IdleSwayConfig::default());
        let rest = RestPose::default();
        let mut bus = RequestBus::new();
        for _ in 0..1000 {
            idle.tick(1.0 / 60.0, &mut bus);
            for target in Target::ALL {
                let pose = idle.pose(target).unwrap();
                assert!(pose.position.distance(rest.pose(target).position) <= 0.04 + 1e-6);
            }
        }
        assert!(bus.is_empty());
        assert!(idle.time < 8.0);
    }

    #[test]
    fn test_idle_hands_move_out_of_phase() {
        let mut idle = IdleSwayGenerator::new(IdleSwayConfig::default());
        let mut bus = RequestBus::new();
        idle.tick(1.0, &mut bus);
        let left = idle.pose(Target::LeftHand).unwrap().position.y;
        let right = idle.pose(Target::RightHand).unwrap().position.y;
        assert!((left - right).abs() > 0.005);
    }

    #[test]
    fn test_always_down_hangs_below_shoulders() {
        let down = AlwaysDownGenerator::new();
        let rest = RestPose::default();
        let left = down.pose(Target::LeftHand).unwrap();
        let right = down.pose(Target::RightHand).unwrap();
        assert!(left.position.x < 0.0 && right.position.x > 0.0);
        assert!((left.position.y - right.position.y).abs() < 1e-6);
        assert!(left.position.y < rest.chest.position.y);
        assert_eq!(down.pose(Target::Body).unwrap(), rest.hips);
        assert_eq!(down.pose(Target::HeadLookAt).unwrap(), rest.look_ahead());
    }
}
