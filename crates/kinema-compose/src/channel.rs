//! Lean channel - one smoothed yaw/pitch/roll suggestion
//!
//! Every lean source (face angle, image tracking, gamepad) runs through the
//! same channel type with its own constants.

use glam::{Quat, Vec3};
use kinema_core::{rotation_from_degrees, KinemaError, KinemaResult, LeanInput};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

/// Constants for one lean channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeanChannelConfig {
    pub smoothing: SmoothingParams,
    /// Overall gain, externally adjustable
    pub amplifier: f32,
    /// Per-axis gain for (yaw, pitch, roll)
    pub axis_scale: Vec3,
    /// Per-axis limit in degrees for (yaw, pitch, roll)
    pub max_degrees: Vec3,
}

impl Default for LeanChannelConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingParams::default(),
            amplifier: 1.0,
            axis_scale: Vec3::ONE,
            max_degrees: Vec3::new(20.0, 15.0, 15.0),
        }
    }
}

impl LeanChannelConfig {
    /// Body follows a fraction of the head rotation
    pub fn face_angle() -> Self {
        Self {
            smoothing: SmoothingParams::relaxed(),
            amplifier: 1.0,
            axis_scale: Vec3::new(0.3, 0.2, 0.35),
            max_degrees: Vec3::new(15.0, 10.0, 10.0),
        }
    }

    pub fn image_tracking() -> Self {
        Self {
            smoothing: SmoothingParams::relaxed(),
            amplifier: 1.0,
            axis_scale: Vec3::ONE,
            max_degrees: Vec3::new(12.0, 8.0, 12.0),
        }
    }

    pub fn gamepad() -> Self {
        Self {
            smoothing: SmoothingParams::responsive(),
            amplifier: 1.0,
            axis_scale: Vec3::ONE,
            max_degrees: Vec3::new(20.0, 15.0, 15.0),
        }
    }

    pub fn validate(&self) -> KinemaResult<()> {
        self.smoothing.validate()?;
        if !(self.amplifier.is_finite() && self.amplifier >= 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "lean amplifier must be non-negative, got {}",
                self.amplifier
            )));
        }
        if !self.axis_scale.is_finite() || self.max_degrees.cmplt(Vec3::ZERO).any() {
            return Err(KinemaError::InvalidConfig(
                "lean axis limits must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Smoothed lean for one source
#[derive(Debug, Clone)]
pub struct LeanChannel {
    config: LeanChannelConfig,
    /// Smoothed (yaw, pitch, roll) in degrees
    angles: SmoothedSignal<Vec3>,
}

impl LeanChannel {
    pub fn new(config: LeanChannelConfig) -> Self {
        Self {
            config,
            angles: SmoothedSignal::with_value(config.smoothing, Vec3::ZERO),
        }
    }

    /// Advance toward `input` (none = settle to neutral) and return the rotation
    pub fn update(&mut self, input: Option<LeanInput>, dt: f32) -> Quat {
        let target = input.map_or(Vec3::ZERO, |lean| self.shape(lean));
        let angles = self.angles.update(target, dt);
        rotation_from_degrees(angles.x, angles.y, angles.z)
    }

    /// Apply gains and per-axis limits to a raw suggestion
    fn shape(&self, lean: LeanInput) -> Vec3 {
        let scaled = lean.to_vec3() * self.config.axis_scale * self.config.amplifier;
        scaled.clamp(-self.config.max_degrees, self.config.max_degrees)
    }

    /// Current smoothed (yaw, pitch, roll) in degrees
    pub fn angles(&self) -> LeanInput {
        LeanInput::from_vec3(self.angles.value())
    }

    pub fn rotation(&self) -> Quat {
        let a = self.angles.value();
        rotation_from_degrees(a.x, a.y, a.z)
    }

    pub fn set_amplifier(&mut self, amplifier: f32) {
        self.config.amplifier = amplifier.max(0.0);
    }

    pub fn config(&self) -> &LeanChannelConfig {
        &self.config
    }

    /// Rest at neutral (model load)
    pub fn seed(&mut self) {
        self.angles.reset(Vec3::ZERO);
    }

    /// Forget all motion (model unload)
    pub fn clear(&mut self) {
        self.angles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_inactive_channel_is_identity() {
        let mut channel = LeanChannel::new(LeanChannelConfig::gamepad());
        for _ in 0..10 {
            assert!(channel.update(None, DT).abs_diff_eq(Quat::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_input_is_clamped() {
        let mut channel = LeanChannel::new(LeanChannelConfig::gamepad());
        for _ in 0..600 {
            channel.update(Some(LeanInput::new(90.0, 0.0, -90.0)), DT);
        }
        let angles = channel.angles();
        assert!((angles.yaw - 20.0).abs() < 0.3);
        assert!((angles.roll + 15.0).abs() < 0.3);
    }

    #[test]
    fn test_settles_back_to_neutral() {
        let mut channel = LeanChannel::new(LeanChannelConfig::face_angle());
        for _ in 0..120 {
            channel.update(Some(LeanInput::new(30.0, 20.0, 10.0)), DT);
        }
        assert!(channel.angles().yaw > 1.0);
        for _ in 0..900 {
            channel.update(None, DT);
        }
        assert!(channel.rotation().abs_diff_eq(Quat::IDENTITY, 1e-3));
    }

    #[test]
    fn test_amplifier_scales_target() {
        let mut weak = LeanChannel::new(LeanChannelConfig::image_tracking());
        let mut strong = LeanChannel::new(LeanChannelConfig::image_tracking());
        weak.set_amplifier(0.5);
        for _ in 0..600 {
            weak.update(Some(LeanInput::new(0.0, 0.0, 8.0)), DT);
            strong.update(Some(LeanInput::new(0.0, 0.0, 8.0)), DT);
        }
        assert!((weak.angles().roll - 4.0).abs() < 0.1);
        assert!((strong.angles().roll - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_config_validation() {
        assert!(LeanChannelConfig::default().validate().is_ok());
        let mut bad = LeanChannelConfig::default();
        bad.amplifier = -1.0;
        assert!(bad.validate().is_err());
    }
}
