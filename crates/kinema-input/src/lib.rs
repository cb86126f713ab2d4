//! KINEMA Input - concrete pose generators
//!
//! Every generator turns one family of input into candidate poses:
//! - Devices: typing, mouse, presentation pointer, gamepad, arcade stick, car handle
//! - Tracking: image and MediaPipe hand tracking, external face tracker
//! - Passive: idle sway and always-down fallbacks
//! - Locomotion for game-input movement
//!
//! Non-finite input is dropped at the generator boundary with a warning;
//! smoothing state never sees NaN.

pub mod car;
pub mod config;
pub mod face;
pub mod gamepad;
pub mod hand;
pub mod keyboard;
pub mod locomotion;
pub mod passive;
pub mod pointer;
pub mod set;

pub use car::*;
pub use config::*;
pub use face::*;
pub use gamepad::*;
pub use hand::*;
pub use keyboard::*;
pub use locomotion::*;
pub use passive::*;
pub use pointer::*;
pub use set::*;

use kinema_core::{GeneratorKind, KinemaResult};

/// Pass a finiteness check through, logging and rejecting failures
pub(crate) fn admit(kind: GeneratorKind, check: KinemaResult<()>) -> bool {
    match check {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(generator = %kind, error = %e, "dropping non-finite input");
            false
        }
    }
}
