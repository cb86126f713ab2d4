//! Input events and continuous tracking samples
//!
//! Discrete device events arrive whenever the user does something; the
//! generators that receive them decide whether the activity is relevant
//! enough to claim a target. Continuous sources (face tracker, hand
//! tracking) deliver one sample per frame at most, tagged with validity.

use std::collections::HashMap;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{GeneratorKind, KinemaError, KinemaResult, Target};

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Gamepad analog sticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadStick {
    Left,
    Right,
}

/// Gamepad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    Start,
    Select,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl GamepadButton {
    /// Hand that presses the button
    pub fn hand(self) -> Target {
        match self {
            GamepadButton::LeftShoulder
            | GamepadButton::LeftTrigger
            | GamepadButton::Select
            | GamepadButton::DPadUp
            | GamepadButton::DPadDown
            | GamepadButton::DPadLeft
            | GamepadButton::DPadRight => Target::LeftHand,
            _ => Target::RightHand,
        }
    }
}

/// Discrete input event from a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    /// Normalized screen position, both axes in [-1, 1], +y up
    MouseMoved { position: Vec2 },
    MouseButton { button: MouseButton, pressed: bool },
    /// Normalized screen position of the presentation pointer
    PresentationPointer { position: Vec2 },
    GamepadStick { stick: GamepadStick, value: Vec2 },
    GamepadButton { button: GamepadButton, pressed: bool },
    /// Lever position, both axes in [-1, 1]
    ArcadeStick { value: Vec2 },
    ArcadeButton { index: u8, pressed: bool },
    /// Steering angle in degrees, positive turns right
    CarHandle { angle_degrees: f32 },
}

impl InputEvent {
    /// Reject NaN/inf payloads before they reach any smoothing state
    pub fn ensure_finite(&self, source_kind: GeneratorKind) -> KinemaResult<()> {
        let finite = match self {
            InputEvent::MouseMoved { position } | InputEvent::PresentationPointer { position } => {
                position.is_finite()
            }
            InputEvent::GamepadStick { value, .. } | InputEvent::ArcadeStick { value } => {
                value.is_finite()
            }
            InputEvent::CarHandle { angle_degrees } => angle_degrees.is_finite(),
            _ => true,
        };
        if finite {
            Ok(())
        } else {
            Err(KinemaError::NonFiniteSample {
                source_kind,
                field: "event",
            })
        }
    }
}

/// Head pose and expression sample from a face tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceSample {
    /// Was a face detected in this sample
    pub detected: bool,
    /// Head rotation in degrees: (pitch, yaw, roll)
    pub head_angles: Vec3,
    /// Head position relative to the calibrated center, meters
    pub head_position: Vec3,
    /// Blendshape weights in [0, 1]
    pub blendshapes: HashMap<String, f32>,
}

impl FaceSample {
    /// Sample meaning "tracker running, no face"
    pub fn lost() -> Self {
        Self::default()
    }

    pub fn detected(head_angles: Vec3, head_position: Vec3) -> Self {
        Self {
            detected: true,
            head_angles,
            head_position,
            blendshapes: HashMap::new(),
        }
    }

    pub fn ensure_finite(&self) -> KinemaResult<()> {
        let field = if !self.head_angles.is_finite() {
            Some("head_angles")
        } else if !self.head_position.is_finite() {
            Some("head_position")
        } else if self.blendshapes.values().any(|v| !v.is_finite()) {
            Some("blendshapes")
        } else {
            None
        };
        match field {
            Some(field) => Err(KinemaError::NonFiniteSample {
                source_kind: GeneratorKind::FaceTracker,
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Which tracking pipeline produced a hand sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandTrackingSource {
    Image,
    MediaPipe,
}

impl HandTrackingSource {
    pub fn generator(self) -> GeneratorKind {
        match self {
            HandTrackingSource::Image => GeneratorKind::ImageHand,
            HandTrackingSource::MediaPipe => GeneratorKind::MediaPipeHand,
        }
    }
}

/// One tracked wrist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    /// Wrist position relative to the avatar's chest, meters
    pub wrist_position: Vec3,
    pub wrist_rotation: Quat,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
}

impl HandSample {
    pub fn is_finite(&self) -> bool {
        self.wrist_position.is_finite()
            && self.wrist_rotation.is_finite()
            && self.confidence.is_finite()
    }
}

/// Per-frame output of a hand tracking pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandTrackingFrame {
    pub source: HandTrackingSource,
    pub left: Option<HandSample>,
    pub right: Option<HandSample>,
    /// Horizontal body center in the image, normalized [-1, 1]
    pub body_center: Option<Vec2>,
}

impl HandTrackingFrame {
    pub fn empty(source: HandTrackingSource) -> Self {
        Self {
            source,
            left: None,
            right: None,
            body_center: None,
        }
    }

    pub fn hand(&self, target: Target) -> Option<&HandSample> {
        match target {
            Target::LeftHand => self.left.as_ref(),
            Target::RightHand => self.right.as_ref(),
            _ => None,
        }
    }

    pub fn ensure_finite(&self) -> KinemaResult<()> {
        let hands_ok = self.left.map_or(true, |h| h.is_finite())
            && self.right.map_or(true, |h| h.is_finite());
        let center_ok = self.body_center.map_or(true, |c| c.is_finite());
        if hands_ok && center_ok {
            Ok(())
        } else {
            Err(KinemaError::NonFiniteSample {
                source_kind: self.source.generator(),
                field: "hand",
            })
        }
    }
}
