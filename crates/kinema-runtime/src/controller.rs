//! Integrated motion controller
//!
//! Owns every generator, one arbiter and one freshness ramp per target, and
//! the body composer. All work happens in `tick`, on the caller's thread.

use std::time::Instant;

use kinema_arbiter::{ArbiterState, PoseGenerator, RequestBus, TargetArbiter};
use kinema_compose::{BodyComposer, BodyTransform};
use kinema_core::{
    BodySuggestions, FaceSample, GeneratorKind, HandTrackingFrame, InputEvent, KinemaError,
    KinemaResult, LeanSource, MotionMode, Pose, RestPose, Target, TargetMap,
};
use kinema_input::GeneratorSet;
use kinema_signal::ConfidenceRamp;
use kinema_transport::LatestSlot;
use tracing::{debug, info, warn};

use crate::{rest_pose_of, MotionConfig, MotionStats, Skeleton};

/// Snapshot of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct MotionFrame {
    /// Poses as written to the skeleton; the body includes lean and offset
    pub poses: TargetMap<Pose>,
    pub owners: TargetMap<Option<GeneratorKind>>,
    pub states: TargetMap<ArbiterState>,
    pub body: BodyTransform,
    pub mode: MotionMode,
}

impl MotionFrame {
    pub fn pose(&self, target: Target) -> Pose {
        self.poses[target]
    }

    pub fn owner(&self, target: Target) -> Option<GeneratorKind> {
        self.owners[target]
    }

    pub fn state(&self, target: Target) -> ArbiterState {
        self.states[target]
    }
}

/// Whether any of the generator's targets is open to it under `mode`
fn is_enabled(mode: MotionMode, generator: &dyn PoseGenerator) -> bool {
    let kind = generator.kind();
    generator.targets().iter().any(|t| mode.allows(kind, *t))
}

/// Frame loop tying generators, arbiters and the body composer together
pub struct IntegratedMotionController {
    config: MotionConfig,
    generators: GeneratorSet,
    bus: RequestBus,
    arbiters: TargetMap<TargetArbiter>,
    /// Owner freshness per target
    ramps: TargetMap<ConfidenceRamp>,
    body: BodyComposer,
    mode: MotionMode,
    rest: Option<RestPose>,
    face_feed: Option<LatestSlot<FaceSample>>,
    last_frame: Option<MotionFrame>,
    stats: MotionStats,
}

impl IntegratedMotionController {
    /// Controller with the built-in generators
    pub fn new(config: MotionConfig) -> KinemaResult<Self> {
        let generators = GeneratorSet::new(&config.input);
        Self::with_generators(config, generators)
    }

    /// Controller with a custom generator set
    pub fn with_generators(config: MotionConfig, generators: GeneratorSet) -> KinemaResult<Self> {
        config.validate()?;

        let mut arbiters = TargetMap::from_fn(TargetArbiter::new);
        for (_, arbiter) in arbiters.iter_mut() {
            arbiter.set_blend_duration(config.arbiter.blend_duration)?;
        }
        let ramps = TargetMap::from_fn(|_| ConfidenceRamp::new(config.confidence));

        Ok(Self {
            generators,
            bus: RequestBus::new(),
            arbiters,
            ramps,
            body: BodyComposer::new(config.body),
            mode: config.mode,
            rest: None,
            face_feed: None,
            last_frame: None,
            stats: MotionStats::default(),
            config,
        })
    }

    // ------------------------------------------------------------------
    // Ingress
    // ------------------------------------------------------------------

    /// Dispatch a discrete input event to every enabled generator
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.stats.events += 1;
        let mode = self.mode;
        for generator in self.generators.iter_mut() {
            if is_enabled(mode, generator.as_ref()) {
                generator.handle_event(event, &mut self.bus);
            }
        }
    }

    /// Feed a face tracker sample directly
    pub fn ingest_face_sample(&mut self, sample: FaceSample) {
        self.stats.face_samples += 1;
        let mode = self.mode;
        for generator in self.generators.iter_mut() {
            if is_enabled(mode, generator.as_ref()) {
                generator.handle_face_sample(&sample, &mut self.bus);
            }
        }
    }

    /// Feed a hand tracking frame
    pub fn ingest_hand_frame(&mut self, frame: HandTrackingFrame) {
        self.stats.hand_frames += 1;
        let mode = self.mode;
        for generator in self.generators.iter_mut() {
            if is_enabled(mode, generator.as_ref()) {
                generator.handle_hand_frame(&frame, &mut self.bus);
            }
        }
    }

    /// Take face samples from a slot filled by another thread, one per tick
    pub fn attach_face_feed(&mut self, slot: LatestSlot<FaceSample>) {
        self.face_feed = Some(slot);
    }

    pub fn detach_face_feed(&mut self) -> Option<LatestSlot<FaceSample>> {
        self.face_feed.take()
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Advance one frame and write the result to `skeleton`
    ///
    /// Returns `Ok(None)` while no model is loaded. A skeleton write error is
    /// returned after every target has been attempted; controller state has
    /// already advanced.
    pub fn tick(
        &mut self,
        dt: f32,
        skeleton: &mut dyn Skeleton,
    ) -> KinemaResult<Option<MotionFrame>> {
        let start = Instant::now();
        self.stats.ticks += 1;

        let Some(rest) = self.rest else {
            self.stats.last_tick_duration = start.elapsed();
            return Ok(None);
        };
        self.stats.frames += 1;

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "ignoring invalid frame delta");
            0.0
        };

        // Stage 1: Face feed, generator ticks, request arbitration
        self.drain_face_feed();
        for generator in self.generators.iter_mut() {
            generator.tick(dt, &mut self.bus);
        }
        self.arbitrate_requests();

        // Stage 2: Owner freshness and passive fallbacks
        self.assign_fallbacks(dt);

        // Stage 3: Resolve arbiters
        let poses = self.resolve_targets(dt, &rest);

        // Stage 4: Compose body lean and offset
        let body = self.compose_body(dt);

        // Stage 5: Apply to skeleton
        let frame = self.build_frame(poses, body);
        let applied = self.apply_frame(&frame, skeleton);

        self.last_frame = Some(frame.clone());
        self.stats.last_tick_duration = start.elapsed();
        applied.map(|()| Some(frame))
    }

    /// Stage 1: Take at most one sample from the face feed
    fn drain_face_feed(&mut self) {
        let sample = self.face_feed.as_ref().and_then(LatestSlot::take_latest);
        if let Some(sample) = sample {
            self.ingest_face_sample(sample);
        }
    }

    /// Stage 1: Resolve this frame's ownership requests per target
    fn arbitrate_requests(&mut self) {
        let requests = self.bus.drain();
        self.stats.requests += requests.len() as u64;

        for target in Target::ALL {
            if let Some(kind) = self.mode.override_for(target) {
                self.assign(target, kind);
                continue;
            }

            let mut candidates = Vec::new();
            for kind in RequestBus::requesters(&requests, target) {
                if !self.mode.allows(kind, target) {
                    self.stats.rejected_requests += 1;
                    debug!(limb = %target, generator = %kind, mode = ?self.mode, "request disabled by motion mode");
                } else if !self.config.arbiter.priority.accepts(target, kind) {
                    self.stats.rejected_requests += 1;
                    let error = KinemaError::TargetRejected {
                        generator: kind,
                        target,
                    };
                    debug!(error = %error, "request rejected");
                } else {
                    candidates.push(kind);
                }
            }

            if let Some(winner) = self.config.arbiter.priority.resolve(target, candidates) {
                self.assign(target, winner);
            }
        }
    }

    /// Stage 2: Replace owners that are gone, disabled or quiet
    fn assign_fallbacks(&mut self, dt: f32) {
        let idle_after = self.config.arbiter.idle_after_seconds;

        for target in Target::ALL {
            if self.mode.override_for(target).is_some() {
                continue;
            }

            let owner = self.arbiters[target].owner();
            let reason = match owner {
                None => Some("unowned"),
                Some(kind) if kind.is_passive() => Some("passive"),
                Some(kind) => {
                    let generator = self.generators.get(kind);
                    let fresh = generator.map_or(false, |g| g.is_fresh(target));
                    let continuous = generator.map_or(false, |g| g.is_continuous());
                    let holding = generator.map_or(false, |g| g.is_holding(target));

                    let transition = self.ramps[target].tick(fresh, dt);
                    if transition.is_some() {
                        debug!(limb = %target, generator = %kind, ?transition, "owner freshness changed");
                    }

                    if !self.mode.allows(kind, target) {
                        Some("disabled by motion mode")
                    } else if !self.ramps[target].is_connected() {
                        Some("owner lost")
                    } else if !continuous
                        && !holding
                        && self.arbiters[target].since_request() >= idle_after
                    {
                        Some("owner inactive")
                    } else {
                        None
                    }
                }
            };

            let Some(reason) = reason else {
                continue;
            };
            if let Some(next) = self.successor(target) {
                if Some(next) != owner && self.assign(target, next) {
                    self.stats.fallbacks += 1;
                    debug!(limb = %target, generator = %next, reason, "fallback assigned");
                }
            }
        }
    }

    /// Stage 3: Blend each target between its previous and current owner
    fn resolve_targets(&mut self, dt: f32, rest: &RestPose) -> TargetMap<Pose> {
        let generators = &self.generators;
        let mut poses = TargetMap::from_fn(|target| rest.pose(target));
        for (target, arbiter) in self.arbiters.iter_mut() {
            if let Some(pose) = arbiter.resolve(dt, |kind| generators.pose(kind, target)) {
                poses[target] = pose;
            }
        }
        poses
    }

    /// Stage 4: Collect lean and offset suggestions and compose them
    fn compose_body(&mut self, dt: f32) -> BodyTransform {
        let mut suggestions = BodySuggestions::new();
        for generator in self.generators.iter() {
            if self.mode.allows(generator.kind(), Target::Body) {
                generator.contribute(&mut suggestions);
            }
        }
        self.body.update(&suggestions, dt)
    }

    fn build_frame(&self, mut poses: TargetMap<Pose>, body: BodyTransform) -> MotionFrame {
        poses[Target::Body] = poses[Target::Body].transformed(body.offset, body.rotation);
        MotionFrame {
            poses,
            owners: TargetMap::from_fn(|t| self.arbiters[t].owner()),
            states: TargetMap::from_fn(|t| self.arbiters[t].state()),
            body,
            mode: self.mode,
        }
    }

    /// Stage 5: Write every target, then the roll rate
    fn apply_frame(&mut self, frame: &MotionFrame, skeleton: &mut dyn Skeleton) -> KinemaResult<()> {
        let mut first_error = None;
        for (target, pose) in frame.poses.iter() {
            if let Err(e) = skeleton.apply(target, *pose) {
                self.stats.skeleton_errors += 1;
                warn!(limb = %target, error = %e, "skeleton rejected pose");
                first_error.get_or_insert(e);
            }
        }
        skeleton.apply_lean_roll_rate(frame.body.roll_rate);
        first_error.map_or(Ok(()), Err)
    }

    /// Best replacement when the owner of `target` has to go
    ///
    /// A fresh continuous tracker that may drive the target wins over the
    /// passive fallback, highest priority first.
    fn successor(&self, target: Target) -> Option<GeneratorKind> {
        let priority = &self.config.arbiter.priority;
        let tracker = priority.order(target).iter().copied().find(|kind| {
            !kind.is_passive()
                && self.mode.allows(*kind, target)
                && self.generators.get(*kind).map_or(false, |g| {
                    g.is_continuous() && g.targets().contains(&target) && g.is_fresh(target)
                })
        });
        tracker.or_else(|| priority.fallback(target, self.generators.idle_enabled()))
    }

    fn assign(&mut self, target: Target, kind: GeneratorKind) -> bool {
        let changed = self.arbiters[target].request_ownership(kind);
        if changed {
            self.ramps[target].reset();
            self.stats.ownership_changes += 1;
        }
        changed
    }

    fn reset_arbitration(&mut self) {
        self.bus.clear();
        for (_, arbiter) in self.arbiters.iter_mut() {
            arbiter.reset();
        }
        for (_, ramp) in self.ramps.iter_mut() {
            ramp.reset();
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Read the rest pose from a newly loaded rig and restart arbitration
    pub fn on_model_loaded(&mut self, skeleton: &dyn Skeleton) -> KinemaResult<()> {
        let rest = rest_pose_of(skeleton)?;
        for generator in self.generators.iter_mut() {
            generator.on_model_loaded(&rest);
        }
        self.reset_arbitration();
        self.body.seed();
        self.rest = Some(rest);
        self.last_frame = None;
        info!(generators = self.generators.len(), "model loaded");
        Ok(())
    }

    pub fn on_model_unloaded(&mut self) {
        if self.rest.take().is_none() {
            return;
        }
        for generator in self.generators.iter_mut() {
            generator.on_model_unloaded();
        }
        self.reset_arbitration();
        self.body.clear();
        self.last_frame = None;
        info!("model unloaded");
    }

    pub fn is_model_loaded(&self) -> bool {
        self.rest.is_some()
    }

    pub fn rest_pose(&self) -> Option<&RestPose> {
        self.rest.as_ref()
    }

    // ------------------------------------------------------------------
    // Configuration commands
    // ------------------------------------------------------------------

    /// Switch mode; targets leaving an override go to their successor
    pub fn set_motion_mode(&mut self, mode: MotionMode) {
        if mode == self.mode {
            return;
        }
        let previous = std::mem::replace(&mut self.mode, mode);
        self.config.mode = mode;
        info!(from = ?previous, to = ?mode, "motion mode changed");

        if self.rest.is_none() {
            return;
        }
        for target in Target::ALL {
            if previous.override_for(target).is_none() || mode.override_for(target).is_some() {
                continue;
            }
            if let Some(next) = self.successor(target) {
                if self.assign(target, next) {
                    self.stats.fallbacks += 1;
                }
            }
        }
    }

    pub fn set_blend_duration(&mut self, duration: f32) -> KinemaResult<()> {
        for (_, arbiter) in self.arbiters.iter_mut() {
            arbiter.set_blend_duration(duration)?;
        }
        self.config.arbiter.blend_duration = duration;
        Ok(())
    }

    pub fn set_lean_amplifier(&mut self, source: LeanSource, amplifier: f32) -> KinemaResult<()> {
        if !(amplifier.is_finite() && amplifier >= 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "lean amplifier must be non-negative, got {}",
                amplifier
            )));
        }
        self.body.set_lean_amplifier(source, amplifier);
        let channel = match source {
            LeanSource::FaceAngle => &mut self.config.body.face,
            LeanSource::ImageTracking => &mut self.config.body.image,
            LeanSource::Gamepad => &mut self.config.body.gamepad,
        };
        channel.amplifier = amplifier;
        Ok(())
    }

    /// Use idle sway or always-down as the passive fallback
    pub fn set_idle_enabled(&mut self, enabled: bool) {
        self.generators.set_idle_enabled(enabled);
        self.config.input.idle.enabled = enabled;
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn owner(&self, target: Target) -> Option<GeneratorKind> {
        self.arbiters[target].owner()
    }

    pub fn arbiter(&self, target: Target) -> &TargetArbiter {
        &self.arbiters[target]
    }

    pub fn ramp(&self, target: Target) -> &ConfidenceRamp {
        &self.ramps[target]
    }

    pub fn body(&self) -> &BodyComposer {
        &self.body
    }

    pub fn generators(&self) -> &GeneratorSet {
        &self.generators
    }

    pub fn generators_mut(&mut self) -> &mut GeneratorSet {
        &mut self.generators
    }

    pub fn last_frame(&self) -> Option<&MotionFrame> {
        self.last_frame.as_ref()
    }

    pub fn stats(&self) -> &MotionStats {
        &self.stats
    }
}
