//! Generator identities
//!
//! Every pose source registered with the controller is identified by its
//! kind. One generator instance exists per kind, and it may serve several
//! targets (the gamepad drives both hands, the face tracker drives the
//! head and the body).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a pose generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum GeneratorKind {
    /// Hands follow typed keys on a virtual keyboard
    Typing = 0x00,
    /// Right hand on a mouse, head looks at the pointer
    Mouse = 0x01,
    /// Arm raised toward a presentation pointer
    Presentation = 0x02,
    /// Both hands hold a gamepad
    Gamepad = 0x03,
    /// Left hand on a lever, right hand over a button grid
    ArcadeStick = 0x04,
    /// Both hands on a steering wheel
    CarHandle = 0x05,
    /// Webcam image-based hand tracking
    ImageHand = 0x06,
    /// MediaPipe hand keypoint tracking
    MediaPipeHand = 0x07,
    /// External face tracker (head pose, body offset)
    FaceTracker = 0x08,
    /// Idle breathing and sway
    Idle = 0x09,
    /// Hands hanging at rest
    AlwaysDown = 0x0A,
    /// Game-input locomotion
    Locomotion = 0x0B,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 12] = [
        GeneratorKind::Typing,
        GeneratorKind::Mouse,
        GeneratorKind::Presentation,
        GeneratorKind::Gamepad,
        GeneratorKind::ArcadeStick,
        GeneratorKind::CarHandle,
        GeneratorKind::ImageHand,
        GeneratorKind::MediaPipeHand,
        GeneratorKind::FaceTracker,
        GeneratorKind::Idle,
        GeneratorKind::AlwaysDown,
        GeneratorKind::Locomotion,
    ];

    /// Passive generators never request ownership on their own; they are
    /// assigned when nothing active claims a target.
    pub fn is_passive(self) -> bool {
        matches!(self, GeneratorKind::Idle | GeneratorKind::AlwaysDown)
    }

    pub fn is_hand_tracking(self) -> bool {
        matches!(self, GeneratorKind::ImageHand | GeneratorKind::MediaPipeHand)
    }

    /// Driven by discrete device events (keyboard, mouse, pads, wheel)
    pub fn is_device(self) -> bool {
        matches!(
            self,
            GeneratorKind::Typing
                | GeneratorKind::Mouse
                | GeneratorKind::Presentation
                | GeneratorKind::Gamepad
                | GeneratorKind::ArcadeStick
                | GeneratorKind::CarHandle
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Typing => "typing",
            GeneratorKind::Mouse => "mouse",
            GeneratorKind::Presentation => "presentation",
            GeneratorKind::Gamepad => "gamepad",
            GeneratorKind::ArcadeStick => "arcade-stick",
            GeneratorKind::CarHandle => "car-handle",
            GeneratorKind::ImageHand => "image-hand",
            GeneratorKind::MediaPipeHand => "mediapipe-hand",
            GeneratorKind::FaceTracker => "face-tracker",
            GeneratorKind::Idle => "idle",
            GeneratorKind::AlwaysDown => "always-down",
            GeneratorKind::Locomotion => "locomotion",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
