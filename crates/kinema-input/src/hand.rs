//! Hand tracking generator - webcam image tracking or MediaPipe
//!
//! Each hand runs its own `ConfidenceRamp`. Trackers usually run slower than
//! the frame loop, so the last accepted sample stays valid until it is older
//! than `stale_after`. Raw wrist data is reintroduced with the ramp's apply
//! rate after a loss, and the hand decays back to its rest placement while
//! tracking is lost. Ownership is requested only when a ramp reconnects;
//! while connected the generator is treated as active.
//!
//! Image tracking also sees the torso and reports a body center, which
//! becomes an `ImageTracking` lean suggestion and a lateral body offset.

use glam::{Vec2, Vec3};
use kinema_arbiter::{PoseGenerator, RequestBus};
use kinema_core::{
    BodySuggestions, GeneratorKind, HandSample, HandTrackingFrame, HandTrackingSource,
    KinemaError, KinemaResult, LeanInput, LeanSource, Pose, RestPose, Target,
};
use kinema_signal::{
    decay_factor, ConfidenceConfig, ConfidenceRamp, RampTransition, SmoothedSignal,
    SmoothingParams,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::admit;

const HANDS: [Target; 2] = [Target::LeftHand, Target::RightHand];
const IMAGE_TARGETS: [Target; 3] = [Target::LeftHand, Target::RightHand, Target::Body];

/// Hand tracking configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandTrackingConfig {
    pub confidence: ConfidenceConfig,
    /// Detector confidence below which a hand counts as lost
    pub min_confidence: f32,
    /// Seconds after which the last frame no longer counts
    pub stale_after: f32,
    pub smoothing: SmoothingParams,
    /// Per-second rate at which a lost hand returns to rest
    pub break_rate: f32,
    /// Lean at a body center of ±1: (yaw, pitch, roll) degrees
    pub body_lean_degrees: Vec3,
    /// Lateral body offset at a body center of ±1, meters
    pub body_offset_scale: f32,
}

impl Default for HandTrackingConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceConfig::default(),
            min_confidence: 0.5,
            stale_after: 0.25,
            smoothing: SmoothingParams::default(),
            break_rate: 2.0,
            body_lean_degrees: Vec3::new(10.0, 6.0, 8.0),
            body_offset_scale: 0.15,
        }
    }
}

impl HandTrackingConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.confidence.validate()?;
        self.smoothing.validate()?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(KinemaError::InvalidConfig(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !(self.stale_after.is_finite() && self.stale_after > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "hand stale_after must be positive, got {}",
                self.stale_after
            )));
        }
        if !(self.break_rate.is_finite() && self.break_rate > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "hand break_rate must be positive, got {}",
                self.break_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct TrackedHand {
    ramp: ConfidenceRamp,
    last: Option<HandSample>,
    age: f32,
    position: SmoothedSignal<Vec3>,
    pose: Pose,
}

/// Hand tracking generator for one pipeline
pub struct HandTrackingGenerator {
    source: HandTrackingSource,
    config: HandTrackingConfig,
    rest: RestPose,
    hands: [TrackedHand; 2],
    body_ramp: ConfidenceRamp,
    last_center: Option<Vec2>,
    center_age: f32,
    center: Vec2,
}

impl HandTrackingGenerator {
    pub fn new(source: HandTrackingSource, config: HandTrackingConfig) -> Self {
        let rest = RestPose::default();
        let hand = |target| TrackedHand {
            ramp: ConfidenceRamp::new(config.confidence),
            last: None,
            age: 0.0,
            position: SmoothedSignal::new(config.smoothing),
            pose: rest.pose(target),
        };
        Self {
            source,
            config,
            rest,
            hands: [hand(Target::LeftHand), hand(Target::RightHand)],
            body_ramp: ConfidenceRamp::new(config.confidence),
            last_center: None,
            center_age: 0.0,
            center: Vec2::ZERO,
        }
    }

    pub fn source(&self) -> HandTrackingSource {
        self.source
    }

    fn tracks_body(&self) -> bool {
        self.source == HandTrackingSource::Image
    }

    fn hand_index(target: Target) -> Option<usize> {
        HANDS.iter().position(|t| *t == target)
    }

    pub fn ramp(&self, target: Target) -> Option<&ConfidenceRamp> {
        match Self::hand_index(target) {
            Some(i) => Some(&self.hands[i].ramp),
            None if target == Target::Body && self.tracks_body() => Some(&self.body_ramp),
            None => None,
        }
    }

    /// Current (decayed) body center
    pub fn body_center(&self) -> Vec2 {
        self.center
    }

    fn tick_hand(&mut self, i: usize, dt: f32, bus: &mut RequestBus) {
        let target = HANDS[i];
        let kind = self.kind();
        let chest = self.rest.chest.position;
        let rest = self.rest.pose(target);
        let decay = decay_factor(self.config.break_rate, dt);
        let stale_after = self.config.stale_after;
        let hand = &mut self.hands[i];
        let sample = if hand.age < stale_after { hand.last } else { None };
        hand.age += dt.max(0.0);

        match hand.ramp.tick(sample.is_some(), dt) {
            Some(RampTransition::Connected) => {
                debug!(generator = %kind, limb = %target, "hand tracking connected");
                bus.publish(target, kind);
            }
            Some(RampTransition::Disconnected) => {
                debug!(generator = %kind, limb = %target, "hand tracking lost");
            }
            None => {}
        }

        match sample {
            Some(sample) => {
                let raw = Pose::new(chest + sample.wrist_position, sample.wrist_rotation);
                let blended = hand.ramp.blend_pose(&hand.pose, &raw);
                let position = hand.position.update(blended.position, dt);
                hand.pose = Pose::new(position, blended.rotation);
            }
            None => {
                let offset = (hand.pose.position - rest.position) * decay;
                let rotation = rest.rotation.slerp(hand.pose.rotation, decay).normalize();
                hand.pose = Pose::new(rest.position + offset, rotation);
                hand.position.reset(hand.pose.position);
            }
        }
    }

    fn tick_body(&mut self, dt: f32, bus: &mut RequestBus) {
        let center = if self.center_age < self.config.stale_after {
            self.last_center
        } else {
            None
        };
        self.center_age += dt.max(0.0);
        if let Some(RampTransition::Connected) = self.body_ramp.tick(center.is_some(), dt) {
            bus.publish(Target::Body, self.kind());
        }
        self.center = match center {
            Some(raw) => self.body_ramp.blend(self.center, raw),
            None => self.center * decay_factor(self.config.break_rate, dt),
        };
    }
}

impl PoseGenerator for HandTrackingGenerator {
    fn kind(&self) -> GeneratorKind {
        self.source.generator()
    }

    fn targets(&self) -> &'static [Target] {
        if self.tracks_body() {
            &IMAGE_TARGETS
        } else {
            &HANDS
        }
    }

    fn handle_hand_frame(&mut self, frame: &HandTrackingFrame, _bus: &mut RequestBus) {
        if frame.source != self.source || !admit(self.kind(), frame.ensure_finite()) {
            return;
        }
        let min_confidence = self.config.min_confidence;
        for (i, target) in HANDS.iter().enumerate() {
            let hand = &mut self.hands[i];
            hand.last = frame
                .hand(*target)
                .filter(|h| h.confidence >= min_confidence)
                .copied();
            hand.age = 0.0;
        }
        if self.tracks_body() {
            self.last_center = frame.body_center.map(|c| c.clamp(Vec2::NEG_ONE, Vec2::ONE));
            self.center_age = 0.0;
        }
    }

    fn tick(&mut self, dt: f32, bus: &mut RequestBus) {
        for i in 0..HANDS.len() {
            self.tick_hand(i, dt, bus);
        }
        if self.tracks_body() {
            self.tick_body(dt, bus);
        }
    }

    fn pose(&self, target: Target) -> Option<Pose> {
        match Self::hand_index(target) {
            Some(i) => Some(self.hands[i].pose),
            None if target == Target::Body && self.tracks_body() => Some(self.rest.hips),
            None => None,
        }
    }

    fn is_fresh(&self, target: Target) -> bool {
        self.ramp(target).is_some_and(ConfidenceRamp::is_connected)
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn contribute(&self, suggestions: &mut BodySuggestions) {
        if !self.tracks_body() || self.center == Vec2::ZERO {
            return;
        }
        let lean = self.config.body_lean_degrees;
        suggestions.suggest(
            LeanSource::ImageTracking,
            LeanInput::new(self.center.x * lean.x, -self.center.y * lean.y, -self.center.x * lean.z),
        );
        suggestions.add_offset(Vec3::X * self.center.x * self.config.body_offset_scale);
    }

    fn on_model_loaded(&mut self, rest: &RestPose) {
        self.rest = *rest;
        for (i, target) in HANDS.iter().enumerate() {
            let hand = &mut self.hands[i];
            hand.ramp.reset();
            hand.last = None;
            hand.age = 0.0;
            hand.pose = rest.pose(*target);
            hand.position.reset(hand.pose.position);
        }
        self.body_ramp.reset();
        self.last_center = None;
        self.center_age = 0.0;
        self.center = Vec2::ZERO;
    }

    fn on_model_unloaded(&mut self) {
        for (i, target) in HANDS.iter().enumerate() {
            let hand = &mut self.hands[i];
            hand.ramp.reset();
            hand.last = None;
            hand.age = 0.0;
            hand.pose = self.rest.pose(*target);
            hand.position.clear();
        }
        self.body_ramp.reset();
        self.last_center = None;
        self.center_age = 0.0;
        self.center = Vec2::ZERO;
    }
}
