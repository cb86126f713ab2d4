//! Body composer - net body transform from every lean source

use glam::{Quat, Vec2, Vec3};
use kinema_core::{BodySuggestions, KinemaError, KinemaResult, LeanSource};
use kinema_signal::{SmoothedSignal, SmoothingParams};
use serde::{Deserialize, Serialize};

use crate::{LeanChannel, LeanChannelConfig, MotionSourceComposer, OffsetCorrection};

/// Body composition configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyComposerConfig {
    pub face: LeanChannelConfig,
    pub image: LeanChannelConfig,
    pub gamepad: LeanChannelConfig,
    pub offset_smoothing: SmoothingParams,
    pub offset_correction: OffsetCorrection,
    /// Maximum offset magnitude in meters
    pub max_offset: f32,
    /// Roll (degrees) reported as a roll rate of 1
    pub roll_rate_max_degrees: f32,
}

impl Default for BodyComposerConfig {
    fn default() -> Self {
        Self {
            face: LeanChannelConfig::face_angle(),
            image: LeanChannelConfig::image_tracking(),
            gamepad: LeanChannelConfig::gamepad(),
            offset_smoothing: SmoothingParams::relaxed(),
            offset_correction: OffsetCorrection::default(),
            max_offset: 0.25,
            roll_rate_max_degrees: 20.0,
        }
    }
}

impl BodyComposerConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.face.validate()?;
        self.image.validate()?;
        self.gamepad.validate()?;
        self.offset_smoothing.validate()?;
        if !(self.max_offset.is_finite() && self.max_offset >= 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "max_offset must be non-negative, got {}",
                self.max_offset
            )));
        }
        if !(self.roll_rate_max_degrees > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "roll_rate_max_degrees must be positive, got {}",
                self.roll_rate_max_degrees
            )));
        }
        Ok(())
    }
}

/// Net body transform for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    /// Composed lean including the offset correction
    pub rotation: Quat,
    /// Smoothed body translation in meters
    pub offset: Vec3,
    /// Signed roll in [-1, 1], drives secondary effects such as elbow opening
    pub roll_rate: f32,
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            offset: Vec3::ZERO,
            roll_rate: 0.0,
        }
    }
}

/// Owns one channel per lean source plus the offset smoother
#[derive(Debug, Clone)]
pub struct BodyComposer {
    config: BodyComposerConfig,
    face: LeanChannel,
    image: LeanChannel,
    gamepad: LeanChannel,
    offset: SmoothedSignal<Vec3>,
    last: BodyTransform,
}

impl BodyComposer {
    pub fn new(config: BodyComposerConfig) -> Self {
        Self {
            config,
            face: LeanChannel::new(config.face),
            image: LeanChannel::new(config.image),
            gamepad: LeanChannel::new(config.gamepad),
            offset: SmoothedSignal::with_value(config.offset_smoothing, Vec3::ZERO),
            last: BodyTransform::default(),
        }
    }

    /// Fold this frame's suggestions into one transform
    pub fn update(&mut self, suggestions: &BodySuggestions, dt: f32) -> BodyTransform {
        let face = self.face.update(suggestions.lean(LeanSource::FaceAngle), dt);
        let image = self.image.update(suggestions.lean(LeanSource::ImageTracking), dt);
        let gamepad = self.gamepad.update(suggestions.lean(LeanSource::Gamepad), dt);

        let target_offset = suggestions.offset.clamp_length_max(self.config.max_offset);
        let offset = self.offset.update(target_offset, dt);

        let lean = MotionSourceComposer::compose_suggestions(face, image, gamepad);
        let correction = self
            .config
            .offset_correction
            .rotation(Vec2::new(offset.x, offset.z));
        let rotation = MotionSourceComposer::compose(&[lean, correction]);
        let roll_rate = MotionSourceComposer::roll_rate(lean, self.config.roll_rate_max_degrees);

        self.last = BodyTransform {
            rotation,
            offset,
            roll_rate,
        };
        self.last
    }

    pub fn last(&self) -> BodyTransform {
        self.last
    }

    pub fn channel(&self, source: LeanSource) -> &LeanChannel {
        match source {
            LeanSource::FaceAngle => &self.face,
            LeanSource::ImageTracking => &self.image,
            LeanSource::Gamepad => &self.gamepad,
        }
    }

    pub fn set_lean_amplifier(&mut self, source: LeanSource, amplifier: f32) {
        match source {
            LeanSource::FaceAngle => self.face.set_amplifier(amplifier),
            LeanSource::ImageTracking => self.image.set_amplifier(amplifier),
            LeanSource::Gamepad => self.gamepad.set_amplifier(amplifier),
        }
    }

    /// Rest at neutral (model load)
    pub fn seed(&mut self) {
        self.face.seed();
        self.image.seed();
        self.gamepad.seed();
        self.offset.reset(Vec3::ZERO);
        self.last = BodyTransform::default();
    }

    /// Drop all carried motion (model unload)
    pub fn clear(&mut self) {
        self.face.clear();
        self.image.clear();
        self.gamepad.clear();
        self.offset.clear();
        self.last = BodyTransform::default();
    }
}
