//! Target arbiter - ownership state machine with eased handover
//!
//! ```text
//!   Idle ──request──▶ Stable ──request(other)──▶ Blending ──elapsed ≥ duration──▶ Stable
//!                                                   │  ▲
//!                                                   └──┘ request(other): origin = last output
//! ```
//!
//! Blending from `Stable` follows the previous generator's live pose, so a
//! moving source keeps moving while it fades out. Re-targeting while already
//! blending freezes the last output as the origin, so the handover never
//! jumps.

use kinema_core::{cubic_ease, GeneratorKind, KinemaError, KinemaResult, Pose, Target};
use tracing::debug;

/// Default handover duration in seconds
pub const DEFAULT_BLEND_DURATION: f32 = 0.25;

/// Observable arbiter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// No owner yet
    Idle,
    /// Passing the owner's pose through
    Stable,
    /// Easing from the origin toward the owner's pose
    Blending,
}

/// Where a blend starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendOrigin {
    /// Live pose of the previous owner
    Generator(GeneratorKind),
    /// Frozen output captured at re-target time
    Snapshot(Pose),
}

/// Per-target arbiter
#[derive(Debug, Clone)]
pub struct TargetArbiter {
    target: Target,
    current: Option<GeneratorKind>,
    origin: Option<BlendOrigin>,
    blend_elapsed: f32,
    blend_duration: f32,
    last_output: Option<Pose>,
    since_request: f32,
    switches: u64,
}

impl TargetArbiter {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            current: None,
            origin: None,
            blend_elapsed: 0.0,
            blend_duration: DEFAULT_BLEND_DURATION,
            last_output: None,
            since_request: 0.0,
            switches: 0,
        }
    }

    pub fn with_blend_duration(target: Target, duration: f32) -> KinemaResult<Self> {
        let mut arbiter = Self::new(target);
        arbiter.set_blend_duration(duration)?;
        Ok(arbiter)
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn state(&self) -> ArbiterState {
        match (self.current, self.origin) {
            (None, _) => ArbiterState::Idle,
            (Some(_), Some(_)) => ArbiterState::Blending,
            (Some(_), None) => ArbiterState::Stable,
        }
    }

    pub fn owner(&self) -> Option<GeneratorKind> {
        self.current
    }

    pub fn origin(&self) -> Option<BlendOrigin> {
        self.origin
    }

    pub fn blend_elapsed(&self) -> f32 {
        self.blend_elapsed
    }

    pub fn blend_duration(&self) -> f32 {
        self.blend_duration
    }

    /// Blend progress in [0, 1]; 1 when not blending
    pub fn blend_progress(&self) -> f32 {
        if self.origin.is_some() {
            (self.blend_elapsed / self.blend_duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn last_output(&self) -> Option<Pose> {
        self.last_output
    }

    /// Seconds since the last ownership request, including no-op repeats
    pub fn since_request(&self) -> f32 {
        self.since_request
    }

    /// Ownership changes since construction or reset
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Hand the target to `kind`. Returns whether ownership changed.
    pub fn request_ownership(&mut self, kind: GeneratorKind) -> bool {
        self.since_request = 0.0;
        let previous = match self.current {
            Some(current) if current == kind => return false,
            previous => previous,
        };

        self.origin = match (self.state(), previous) {
            (ArbiterState::Idle, _) | (_, None) => None,
            (ArbiterState::Stable, Some(prev)) => Some(BlendOrigin::Generator(prev)),
            (ArbiterState::Blending, Some(_)) => match self.last_output {
                Some(pose) => Some(BlendOrigin::Snapshot(pose)),
                None => self.origin,
            },
        };
        self.blend_elapsed = 0.0;
        self.current = Some(kind);
        self.switches += 1;

        debug!(
            limb = %self.target,
            from = previous.map(GeneratorKind::name).unwrap_or("none"),
            to = %kind,
            blending = self.origin.is_some(),
            "ownership changed"
        );
        true
    }

    /// Advance the blend and produce this frame's pose
    ///
    /// `lookup` returns the live pose of a generator. A missing or
    /// non-finite owner pose holds the last output.
    pub fn resolve(
        &mut self,
        dt: f32,
        mut lookup: impl FnMut(GeneratorKind) -> Option<Pose>,
    ) -> Option<Pose> {
        let current = self.current?;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.since_request += dt;

        if self.origin.is_some() {
            self.blend_elapsed = (self.blend_elapsed + dt).min(self.blend_duration);
        }

        let Some(target_pose) = lookup(current).filter(Pose::is_finite) else {
            return self.last_output;
        };

        let output = match self.origin {
            Some(_) if self.blend_elapsed >= self.blend_duration => {
                self.origin = None;
                target_pose
            }
            Some(origin) => {
                let from = match origin {
                    BlendOrigin::Generator(kind) => {
                        lookup(kind).filter(Pose::is_finite).or(self.last_output)
                    }
                    BlendOrigin::Snapshot(pose) => Some(pose),
                };
                match from {
                    Some(from) => {
                        let t = cubic_ease(self.blend_elapsed / self.blend_duration);
                        from.lerp(&target_pose, t)
                    }
                    None => target_pose,
                }
            }
            None => target_pose,
        };

        self.last_output = Some(output);
        Some(output)
    }

    pub fn set_blend_duration(&mut self, duration: f32) -> KinemaResult<()> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "blend duration must be positive, got {duration}"
            )));
        }
        self.blend_duration = duration;
        self.blend_elapsed = self.blend_elapsed.min(duration);
        Ok(())
    }

    /// Back to `Idle`, keeping the blend duration
    pub fn reset(&mut self) {
        self.current = None;
        self.origin = None;
        self.blend_elapsed = 0.0;
        self.last_output = None;
        self.since_request = 0.0;
        self.switches = 0;
    }
}
