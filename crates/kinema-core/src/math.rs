//! Scalar helpers shared by the motion crates

use glam::{EulerRot, Quat};

/// Smoothstep-like ease with zero slope at both ends: `2x²(1.5 - x)`
#[inline]
pub fn cubic_ease(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    2.0 * x * x * (1.5 - x)
}

/// Normalize an angle into (-180, 180]
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation from yaw (Y), pitch (X) and roll (Z) in degrees, applied Y-X-Z
pub fn rotation_from_degrees(yaw: f32, pitch: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cubic_ease_endpoints() {
        assert_eq!(cubic_ease(0.0), 0.0);
        assert!((cubic_ease(1.0) - 1.0).abs() < 1e-6);
        assert!((cubic_ease(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(cubic_ease(-2.0), 0.0);
        assert!((cubic_ease(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cubic_ease_flat_ends() {
        let h = 1e-3;
        let start_slope = (cubic_ease(h) - cubic_ease(0.0)) / h;
        let end_slope = (cubic_ease(1.0) - cubic_ease(1.0 - h)) / h;
        assert!(start_slope < 0.01);
        assert!(end_slope < 0.01);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_cubic_ease_monotonic(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(cubic_ease(lo) <= cubic_ease(hi) + 1e-6);
        }

        #[test]
        fn prop_normalize_degrees_range(angle in -10_000.0f32..10_000.0) {
            let n = normalize_degrees(angle);
            prop_assert!(n > -180.0 && n <= 180.0);
        }
    }
}
