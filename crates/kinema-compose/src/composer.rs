//! Rotation composition and roll extraction

use glam::Quat;
use kinema_core::normalize_degrees;

/// Stateless composition of lean rotations
pub struct MotionSourceComposer;

impl MotionSourceComposer {
    /// Multiply suggestions in slice order; identity when empty
    pub fn compose(suggestions: &[Quat]) -> Quat {
        suggestions
            .iter()
            .fold(Quat::IDENTITY, |acc, q| acc * *q)
            .normalize()
    }

    /// Face-angle lean × image-tracking lean × gamepad lean
    pub fn compose_suggestions(face: Quat, image: Quat, gamepad: Quat) -> Quat {
        Self::compose(&[face, image, gamepad])
    }

    /// Signed roll of `rotation` normalized to [-1, 1]
    ///
    /// The axis-angle angle is folded into (-180, 180] and weighted by the
    /// axis z component as an approximation of roll, then clamped to
    /// `max_degrees` and divided by it.
    pub fn roll_rate(rotation: Quat, max_degrees: f32) -> f32 {
        if max_degrees <= 0.0 {
            return 0.0;
        }
        let (axis, angle) = rotation.normalize().to_axis_angle();
        let degrees = normalize_degrees(angle.to_degrees());
        let roll = (degrees * axis.z).clamp(-max_degrees, max_degrees);
        roll / max_degrees
    }
}
