//! Face tracker generator - head look-at, face-angle lean and body offset
//!
//! Samples arrive from an external tracker at its own rate. A sample older
//! than `stale_after` counts as lost even if it said a face was detected,
//! so a stalled feed decays to neutral the same way a lost face does.

use std::collections::HashMap;

use glam::Vec3;
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{
    rotation_from_degrees, BodySuggestions, FaceSample, GeneratorKind, KinemaError, KinemaResult,
    LeanInput, LeanSource, Pose, RestPose, Target,
};
use kinema_signal::{
    decay_factor, ConfidenceConfig, ConfidenceRamp, RampTransition, SmoothedSignal,
    SmoothingParams,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::admit;

const FACE_TARGETS: [Target; 2] = [Target::HeadLookAt, Target::Body];

/// Face tracker configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceTrackerConfig {
    pub confidence: ConfidenceConfig,
    /// Seconds after which the last sample no longer counts
    pub stale_after: f32,
    pub smoothing: SmoothingParams,
    /// Per-second rate at which a lost face returns to neutral
    pub break_rate: f32,
    /// Distance of the look-at point from the head
    pub look_distance: f32,
    /// Body offset per meter of head offset
    pub offset_scale: Vec3,
}

impl Default for FaceTrackerConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceConfig::default(),
            stale_after: 0.25,
            smoothing: SmoothingParams::default(),
            break_rate: 3.0,
            look_distance: 1.0,
            offset_scale: Vec3::new(0.8, 0.0, 0.6),
        }
    }
}

impl FaceTrackerConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.confidence.validate()?;
        self.smoothing.validate()?;
        if !(self.stale_after > 0.0 && self.break_rate > 0.0 && self.look_distance > 0.0) {
            return Err(KinemaError::InvalidConfig(
                "face stale_after, break_rate and look_distance must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Face tracker generator
pub struct FaceTrackerGenerator {
    config: FaceTrackerConfig,
    rest: RestPose,
    latest: Option<FaceSample>,
    age: f32,
    ramp: ConfidenceRamp,
    /// (pitch, yaw, roll) degrees
    angles: SmoothedSignal<Vec3>,
    position: SmoothedSignal<Vec3>,
    blendshapes: HashMap<String, f32>,
    samples: u64,
}

impl FaceTrackerGenerator {
    pub fn new(config: FaceTrackerConfig) -> Self {
        Self {
            config,
            rest: RestPose::default(),
            latest: None,
            age: 0.0,
            ramp: ConfidenceRamp::new(config.confidence),
            angles: SmoothedSignal::with_value(config.smoothing, Vec3::ZERO),
            position: SmoothedSignal::with_value(config.smoothing, Vec3::ZERO),
            blendshapes: HashMap::new(),
            samples: 0,
        }
    }

    /// Smoothed (pitch, yaw, roll) in degrees
    pub fn head_angles(&self) -> Vec3 {
        self.angles.value()
    }

    /// Smoothed head offset from the calibrated center
    pub fn head_offset(&self) -> Vec3 {
        self.position.value()
    }

    /// Expression weights from the last detected sample
    pub fn blendshapes(&self) -> &HashMap<String, f32> {
        &self.blendshapes
    }

    pub fn ramp(&self) -> &ConfidenceRamp {
        &self.ramp
    }

    /// Accepted samples since construction
    pub fn samples(&self) -> u64 {
        self.samples
    }

    fn look_at(&self) -> Pose {
        let angles = self.angles.value();
        let head = self.rest.head.position + self.position.value();
        let facing = rotation_from_degrees(angles.y, angles.x, angles.z);
        Pose::new(head + facing * Vec3::Z * self.config.look_distance, facing)
    }

    fn clear_motion(&mut self) {
        self.latest = None;
        self.age = 0.0;
        self.ramp.reset();
        self.angles.reset(Vec3::ZERO);
        self.position.reset(Vec3::ZERO);
        self.blendshapes.clear();
    }
}

impl PoseGenerator for FaceTrackerGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::FaceTracker
    }

    fn targets(&self) -> &'static [Target] {
        &FACE_TARGETS
    }

    fn handle_face_sample(&mut self, sample: &FaceSample, _bus: &mut RequestBus) {
        if !admit(GeneratorKind::FaceTracker, sample.ensure_finite()) {
            return;
        }
        if sample.detected {
            self.blendshapes.clone_from(&sample.blendshapes);
        }
        self.latest = Some(sample.clone());
        self.age = 0.0;
        self.samples += 1;
    }

    fn tick(&mut self, dt: f32, bus: &mut RequestBus) {
        let valid = self
            .latest
            .as_ref()
            .is_some_and(|s| s.detected && self.age < self.config.stale_after);
        self.age += dt.max(0.0);

        match self.ramp.tick(valid, dt) {
            Some(RampTransition::Connected) => {
                debug!("face tracking connected");
                bus.publish_all(&FACE_TARGETS, GeneratorKind::FaceTracker);
            }
            Some(RampTransition::Disconnected) => debug!("face tracking lost"),
            None => {}
        }

        match self.latest.as_ref().filter(|_| valid) {
            Some(sample) => {
                let angles = self.ramp.blend(self.angles.value(), sample.head_angles);
                let position = self.ramp.blend(self.position.value(), sample.head_position);
                self.angles.update(angles, dt);
                self.position.update(position, dt);
            }
            None => {
                let decay = decay_factor(self.config.break_rate, dt);
                self.angles.reset(self.angles.value() * decay);
                self.position.reset(self.position.value() * decay);
            }
        }
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        match target {
            Target::HeadLookAt => Some(self.look_at()),
            Target::Body => Some(self.rest.hips),
            _ => None,
        }
    }

    fn is_fresh(&self, _target: Target) -> bool {
        self.ramp.is_connected()
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn contribute(&self, suggestions: &mut BodySuggestions) {
        let angles = self.angles.value();
        let offset = self.position.value();
        if angles == Vec3::ZERO && offset == Vec3::ZERO {
            return;
        }
        suggestions.suggest(LeanSource::FaceAngle, LeanInput::new(angles.y, angles.x, angles.z));
        suggestions.add_offset(offset * self.config.offset_scale);
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        self.clear_motion();
    }

    fn on_model_unloaded(&mut self) {
        self.clear_motion();
    }
}
