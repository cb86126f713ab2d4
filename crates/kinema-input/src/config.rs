//! Generator tunables

use kinema_core::KinemaResult;
use serde::{Deserialize, Serialize};

use crate::{
    ArcadeStickConfig, CarHandleConfig, FaceTrackerConfig, GamepadConfig, HandTrackingConfig,
    IdleSwayConfig, LocomotionConfig, MouseConfig, PresentationConfig, TypingConfig,
};

/// Configuration for every generator in a `GeneratorSet`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub typing: TypingConfig,
    pub mouse: MouseConfig,
    pub presentation: PresentationConfig,
    pub gamepad: GamepadConfig,
    pub arcade_stick: ArcadeStickConfig,
    pub car_handle: CarHandleConfig,
    /// Shared by the image and MediaPipe pipelines
    pub hand_tracking: HandTrackingConfig,
    pub face: FaceTrackerConfig,
    pub idle: IdleSwayConfig,
    pub locomotion: LocomotionConfig,
}

impl InputConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.typing.validate()?;
        self.mouse.validate()?;
        self.presentation.validate()?;
        self.gamepad.validate()?;
        self.arcade_stick.validate()?;
        self.car_handle.validate()?;
        self.hand_tracking.validate()?;
        self.face.validate()?;
        self.idle.validate()?;
        self.locomotion.validate()
    }
}
