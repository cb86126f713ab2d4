//! Lean suggestions - body motion proposed by unrelated subsystems
//!
//! Suggestions are collected fresh every frame. A source that has nothing
//! to say leaves its slot empty, which the composer treats as identity.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Subsystems allowed to propose a body lean, in composition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeanSource {
    FaceAngle,
    ImageTracking,
    Gamepad,
}

impl LeanSource {
    /// Composition order: face-angle × image-tracking × gamepad
    pub const ORDER: [LeanSource; 3] = [
        LeanSource::FaceAngle,
        LeanSource::ImageTracking,
        LeanSource::Gamepad,
    ];

    fn index(self) -> usize {
        match self {
            LeanSource::FaceAngle => 0,
            LeanSource::ImageTracking => 1,
            LeanSource::Gamepad => 2,
        }
    }
}

/// Raw lean in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeanInput {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl LeanInput {
    pub const ZERO: LeanInput = LeanInput {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// (yaw, pitch, roll) packed for per-axis arithmetic
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.yaw, self.pitch, self.roll)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::from_vec3(self.to_vec3() * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vec3().is_finite()
    }
}

/// Everything proposed for the body this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodySuggestions {
    leans: [Option<LeanInput>; 3],
    /// Body translation in meters (x right, y up, z forward)
    pub offset: Vec3,
}

impl BodySuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a lean; a second proposal from the same source accumulates
    pub fn suggest(&mut self, source: LeanSource, lean: LeanInput) {
        let slot = &mut self.leans[source.index()];
        let merged = match *slot {
            Some(existing) => LeanInput::from_vec3(existing.to_vec3() + lean.to_vec3()),
            None => lean,
        };
        *slot = Some(merged);
    }

    pub fn add_offset(&mut self, offset: Vec3) {
        self.offset += offset;
    }

    pub fn lean(&self, source: LeanSource) -> Option<LeanInput> {
        self.leans[source.index()]
    }

    /// Horizontal part of the offset: (x lateral, z forward)
    pub fn planar_offset(&self) -> Vec2 {
        Vec2::new(self.offset.x, self.offset.z)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
