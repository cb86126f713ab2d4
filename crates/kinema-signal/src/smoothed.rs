//! Smoothed signal - damped spring filter
//!
//! One filter type serves every lean and offset channel; channels differ
//! only in their `SmoothingParams`.
//!
//! Per update:
//! ```text
//! ideal    = (target - value) / time_constant
//! velocity = lerp(velocity, ideal, lerp_factor * dt)
//! velocity *= damping_factor
//! value   += velocity * dt
//! ```
//! NaN targets are not filtered here. A single NaN poisons the state for
//! good, so generators must reject them before calling `update`.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3};
use kinema_core::{KinemaError, KinemaResult};
use serde::{Deserialize, Serialize};

/// Values the filter can smooth
pub trait SignalValue:
    Copy + Debug + PartialEq + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    const ZERO: Self;

    fn magnitude(self) -> f32;
}

impl SignalValue for f32 {
    const ZERO: Self = 0.0;

    fn magnitude(self) -> f32 {
        self.abs()
    }
}

impl SignalValue for Vec2 {
    const ZERO: Self = Vec2::ZERO;

    fn magnitude(self) -> f32 {
        self.length()
    }
}

impl SignalValue for Vec3 {
    const ZERO: Self = Vec3::ZERO;

    fn magnitude(self) -> f32 {
        self.length()
    }
}

/// Filter constants for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// Seconds the ideal velocity would take to close the current gap
    pub time_constant: f32,
    /// How fast velocity chases its ideal value (per second)
    pub lerp_factor: f32,
    /// Per-update velocity multiplier, slightly below 1
    pub damping_factor: f32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            time_constant: 0.2,
            lerp_factor: 10.0,
            damping_factor: 0.95,
        }
    }
}

impl SmoothingParams {
    pub fn new(time_constant: f32, lerp_factor: f32, damping_factor: f32) -> Self {
        Self {
            time_constant,
            lerp_factor,
            damping_factor,
        }
    }

    /// Quicker response for gamepad-driven lean
    pub fn responsive() -> Self {
        Self::new(0.12, 14.0, 0.93)
    }

    /// Slow settle for camera-derived signals
    pub fn relaxed() -> Self {
        Self::new(0.35, 6.0, 0.96)
    }

    pub fn validate(&self) -> KinemaResult<()> {
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "time_constant must be positive, got {}",
                self.time_constant
            )));
        }
        if !(self.lerp_factor.is_finite() && self.lerp_factor > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "lerp_factor must be positive, got {}",
                self.lerp_factor
            )));
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "damping_factor must be in (0, 1], got {}",
                self.damping_factor
            )));
        }
        Ok(())
    }
}

/// Damped spring filter over a scalar or vector
#[derive(Debug, Clone)]
pub struct SmoothedSignal<T: SignalValue> {
    params: SmoothingParams,
    value: T,
    velocity: T,
    /// False until seeded; the first update then snaps to its target
    seeded: bool,
}

impl<T: SignalValue> SmoothedSignal<T> {
    /// Create an unseeded filter
    pub fn new(params: SmoothingParams) -> Self {
        Self {
            params,
            value: T::ZERO,
            velocity: T::ZERO,
            seeded: false,
        }
    }

    /// Create a filter already resting at `value`
    pub fn with_value(params: SmoothingParams, value: T) -> Self {
        let mut signal = Self::new(params);
        signal.reset(value);
        signal
    }

    /// Advance one frame toward `target` and return the new value
    pub fn update(&mut self, target: T, dt: f32) -> T {
        if !self.seeded {
            self.reset(target);
            return self.value;
        }
        if dt <= 0.0 {
            return self.value;
        }

        let ideal = (target - self.value) * (1.0 / self.params.time_constant);
        let k = (self.params.lerp_factor * dt).clamp(0.0, 1.0);
        self.velocity = self.velocity + (ideal - self.velocity) * k;
        self.velocity = self.velocity * self.params.damping_factor;
        self.value = self.value + self.velocity * dt;
        self.value
    }

    /// Seed the value and stop all motion (model load)
    pub fn reset(&mut self, value: T) {
        self.value = value;
        self.velocity = T::ZERO;
        self.seeded = true;
    }

    /// Forget everything; the next update snaps to its target (model unload)
    pub fn clear(&mut self) {
        self.value = T::ZERO;
        self.velocity = T::ZERO;
        self.seeded = false;
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn velocity(&self) -> T {
        self.velocity
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    /// Swap constants without disturbing value or velocity
    pub fn set_params(&mut self, params: SmoothingParams) {
        self.params = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_first_update_snaps() {
        let mut s = SmoothedSignal::<f32>::new(SmoothingParams::default());
        assert!(!s.is_seeded());
        assert_eq!(s.update(5.0, DT), 5.0);
        assert_eq!(s.velocity(), 0.0);
    }

    #[test]
    fn test_converges_to_constant_target() {
        let mut s = SmoothedSignal::with_value(SmoothingParams::default(), 0.0f32);
        for _ in 0..600 {
            s.update(10.0, DT);
        }
        assert!((s.value() - 10.0).abs() < 0.1, "value {}", s.value());
        assert!(s.velocity().abs() < 0.05, "velocity {}", s.velocity());
    }

    #[test]
    fn test_vector_converges() {
        let target = Vec3::new(1.0, -2.0, 0.5);
        let mut s = SmoothedSignal::with_value(SmoothingParams::relaxed(), Vec3::ZERO);
        for _ in 0..900 {
            s.update(target, DT);
        }
        assert!((s.value() - target).length() < 0.01 * target.length());
        assert!(s.velocity().length() < 0.05);
    }

    #[test]
    fn test_no_overshoot_blowup_on_jump() {
        let mut s = SmoothedSignal::with_value(SmoothingParams::default(), 0.0f32);
        let mut peak = 0.0f32;
        for _ in 0..300 {
            peak = peak.max(s.update(1.0, DT));
        }
        assert!(peak < 1.2, "peak {}", peak);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut s = SmoothedSignal::with_value(SmoothingParams::default(), 1.0f32);
        s.update(3.0, DT);
        let before = (s.value(), s.velocity());
        s.update(100.0, 0.0);
        assert_eq!((s.value(), s.velocity()), before);
    }

    #[test]
    fn test_clear_then_snap() {
        let mut s = SmoothedSignal::with_value(SmoothingParams::default(), 0.0f32);
        s.update(4.0, DT);
        s.clear();
        assert_eq!(s.update(-2.0, DT), -2.0);
    }

    #[test]
    fn test_params_validation() {
        assert!(SmoothingParams::default().validate().is_ok());
        assert!(SmoothingParams::new(0.0, 10.0, 0.9).validate().is_err());
        assert!(SmoothingParams::new(0.2, -1.0, 0.9).validate().is_err());
        assert!(SmoothingParams::new(0.2, 10.0, 1.5).validate().is_err());
        assert!(SmoothingParams::new(f32::NAN, 10.0, 0.9).validate().is_err());
    }
}
