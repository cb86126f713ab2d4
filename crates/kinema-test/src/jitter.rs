//! Input jitter model

use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

/// Imperfections applied to simulated frames and tracking samples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputJitter {
    /// Relative frame time variation, 0.1 = ±10%
    pub frame_time: f32,
    /// Uniform noise added to tracked positions, meters
    pub position_noise: f32,
    /// Uniform noise added to tracked angles, degrees
    pub angle_noise: f32,
    /// Probability that a tracking sample never arrives
    pub dropout: f64,
}

impl InputJitter {
    /// No jitter at all
    pub fn perfect() -> Self {
        Self {
            frame_time: 0.0,
            position_noise: 0.0,
            angle_noise: 0.0,
            dropout: 0.0,
        }
    }

    /// Typical webcam tracking on a steady frame rate
    pub fn mild() -> Self {
        Self {
            frame_time: 0.05,
            position_noise: 0.003,
            angle_noise: 0.5,
            dropout: 0.02,
        }
    }

    /// Noisy tracker and uneven frames
    pub fn unstable() -> Self {
        Self {
            frame_time: 0.5,
            position_noise: 0.02,
            angle_noise: 4.0,
            dropout: 0.3,
        }
    }

    /// Frame time after jitter; never negative
    pub fn frame_dt(&self, dt: f32, rng: &mut StdRng) -> f32 {
        if self.frame_time <= 0.0 {
            return dt;
        }
        let scale = rng.gen_range(-self.frame_time..=self.frame_time);
        (dt * (1.0 + scale)).max(0.0)
    }

    pub fn position(&self, rng: &mut StdRng) -> Vec3 {
        noise(self.position_noise, rng)
    }

    pub fn angles(&self, rng: &mut StdRng) -> Vec3 {
        noise(self.angle_noise, rng)
    }

    /// Whether the next tracking sample is lost
    pub fn drops(&self, rng: &mut StdRng) -> bool {
        self.dropout > 0.0 && rng.gen_bool(self.dropout.min(1.0))
    }
}

impl Default for InputJitter {
    fn default() -> Self {
        Self::perfect()
    }
}

fn noise(amplitude: f32, rng: &mut StdRng) -> Vec3 {
    if amplitude <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-amplitude..=amplitude),
        rng.gen_range(-amplitude..=amplitude),
        rng.gen_range(-amplitude..=amplitude),
    )
}
