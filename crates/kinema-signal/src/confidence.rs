//! Confidence ramp - graceful recovery from tracking dropout
//!
//! Two saturating counters, exactly one of which advances per tick:
//! - `tracked_seconds` while the signal is valid, capped at `recovery_duration`
//! - `lost_seconds` while it is invalid, capped at `loss_timeout`
//!
//! `apply_rate` restarts at 0 the instant a source comes back, so raw values
//! are faded in with `lerp(previous, raw, apply_rate)` instead of snapping.
//! While disconnected, callers decay their offsets toward neutral with
//! `decay_factor` instead of freezing them.

use kinema_core::{KinemaError, KinemaResult, Pose};
use serde::{Deserialize, Serialize};

use crate::SignalValue;

/// Ramp thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Seconds of continuous validity before raw data is applied in full
    pub recovery_duration: f32,
    /// Seconds of continuous invalidity before the source counts as lost
    pub loss_timeout: f32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            recovery_duration: 0.5,
            loss_timeout: 0.3,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        if !(self.recovery_duration.is_finite() && self.recovery_duration > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "recovery_duration must be positive, got {}",
                self.recovery_duration
            )));
        }
        if !(self.loss_timeout.is_finite() && self.loss_timeout > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "loss_timeout must be positive, got {}",
                self.loss_timeout
            )));
        }
        Ok(())
    }
}

/// Connection change reported by `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampTransition {
    Connected,
    Disconnected,
}

/// Tracked/lost state machine for one signal source
#[derive(Debug, Clone)]
pub struct ConfidenceRamp {
    config: ConfidenceConfig,
    tracked_seconds: f32,
    lost_seconds: f32,
}

impl ConfidenceRamp {
    /// New ramp in the "no tracking" baseline
    pub fn new(config: ConfidenceConfig) -> Self {
        Self {
            config,
            tracked_seconds: 0.0,
            lost_seconds: config.loss_timeout,
        }
    }

    /// Advance by one frame
    pub fn tick(&mut self, valid: bool, dt: f32) -> Option<RampTransition> {
        let was_connected = self.is_connected();
        let dt = dt.max(0.0);

        if valid {
            self.lost_seconds = 0.0;
            self.tracked_seconds = (self.tracked_seconds + dt).min(self.config.recovery_duration);
        } else {
            self.tracked_seconds = 0.0;
            self.lost_seconds = (self.lost_seconds + dt).min(self.config.loss_timeout);
        }

        match (was_connected, self.is_connected()) {
            (false, true) => Some(RampTransition::Connected),
            (true, false) => Some(RampTransition::Disconnected),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.lost_seconds < self.config.loss_timeout
    }

    /// Weight for raw tracking data, in [0, 1]
    pub fn apply_rate(&self) -> f32 {
        (self.tracked_seconds / self.config.recovery_duration).clamp(0.0, 1.0)
    }

    pub fn tracked_seconds(&self) -> f32 {
        self.tracked_seconds
    }

    pub fn lost_seconds(&self) -> f32 {
        self.lost_seconds
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Replace thresholds; counters are re-clamped into the new ranges
    pub fn set_config(&mut self, config: ConfidenceConfig) {
        self.config = config;
        self.tracked_seconds = self.tracked_seconds.min(config.recovery_duration);
        self.lost_seconds = self.lost_seconds.min(config.loss_timeout);
    }

    /// Back to the "no tracking" baseline
    pub fn reset(&mut self) {
        self.tracked_seconds = 0.0;
        self.lost_seconds = self.config.loss_timeout;
    }

    /// `lerp(previous, raw, apply_rate)`
    pub fn blend<T: SignalValue>(&self, previous: T, raw: T) -> T {
        previous + (raw - previous) * self.apply_rate()
    }

    pub fn blend_pose(&self, previous: &Pose, raw: &Pose) -> Pose {
        previous.lerp(raw, self.apply_rate())
    }
}

/// Per-frame multiplier for decaying toward neutral: `max(0, 1 - break_rate * dt)`
#[inline]
pub fn decay_factor(break_rate: f32, dt: f32) -> f32 {
    (1.0 - break_rate * dt).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn ramp() -> ConfidenceRamp {
        ConfidenceRamp::new(ConfidenceConfig {
            recovery_duration: 0.5,
            loss_timeout: 0.3,
        })
    }

    #[test]
    fn test_baseline_is_disconnected() {
        let r = ramp();
        assert!(!r.is_connected());
        assert_eq!(r.apply_rate(), 0.0);
    }

    #[test]
    fn test_reconnect_on_first_valid_frame() {
        let mut r = ramp();
        assert_eq!(r.tick(true, DT), Some(RampTransition::Connected));
        assert!(r.is_connected());
        assert!(r.apply_rate() > 0.0 && r.apply_rate() < 0.1);
    }

    #[test]
    fn test_apply_rate_ramps_to_one() {
        let mut r = ramp();
        for _ in 0..15 {
            r.tick(true, DT);
        }
        assert!((r.apply_rate() - 0.5).abs() < 0.01);
        for _ in 0..60 {
            r.tick(true, DT);
        }
        assert_eq!(r.apply_rate(), 1.0);
        assert_eq!(r.tracked_seconds(), 0.5);
    }

    #[test]
    fn test_disconnects_only_after_timeout() {
        let mut r = ramp();
        r.tick(true, DT);
        // 0.25s of loss: still connected
        for _ in 0..15 {
            assert_eq!(r.tick(false, DT), None);
        }
        assert!(r.is_connected());
        assert_eq!(r.apply_rate(), 0.0);

        let mut transition = None;
        for _ in 0..10 {
            transition = transition.or(r.tick(false, DT));
        }
        assert_eq!(transition, Some(RampTransition::Disconnected));
        assert!(!r.is_connected());
    }

    #[test]
    fn test_blend_follows_apply_rate() {
        let mut r = ramp();
        assert_eq!(r.blend(1.0f32, 3.0), 1.0);
        for _ in 0..60 {
            r.tick(true, DT);
        }
        assert_eq!(r.blend(1.0f32, 3.0), 3.0);
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let mut r = ramp();
        for _ in 0..60 {
            r.tick(true, DT);
        }
        r.reset();
        assert!(!r.is_connected());
        assert_eq!(r.apply_rate(), 0.0);
    }

    #[test]
    fn test_decay_factor() {
        assert!((decay_factor(2.0, 0.1) - 0.8).abs() < 1e-6);
        assert_eq!(decay_factor(50.0, 0.1), 0.0);
    }

    proptest! {
        #[test]
        fn prop_ramp_bounds(frames in proptest::collection::vec((any::<bool>(), 0.0f32..0.1), 1..400)) {
            let mut r = ramp();
            let mut invalid_run = 0.0f32;
            let mut seen_valid = false;
            for (valid, dt) in frames {
                r.tick(valid, dt);
                let rate = r.apply_rate();
                prop_assert!((0.0..=1.0).contains(&rate));
                prop_assert!(r.tracked_seconds() == 0.0 || r.lost_seconds() == 0.0);

                if valid {
                    seen_valid = true;
                    invalid_run = 0.0;
                    prop_assert!(r.is_connected());
                } else {
                    invalid_run += dt;
                    if seen_valid && invalid_run < 0.3 - 1e-4 {
                        prop_assert!(r.is_connected());
                    }
                    if invalid_run >= 0.3 + 1e-4 {
                        prop_assert!(!r.is_connected());
                    }
                }
            }
        }
    }
}
