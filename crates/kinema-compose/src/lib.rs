//! KINEMA Compose - folding lean and offset suggestions into one body transform
//!
//! Face angle, image tracking and gamepad input each propose a body lean.
//! Each proposal is smoothed on its own channel, then the channels are
//! multiplied in a fixed order. A planar body offset adds a small
//! corrective rotation so translation does not look rigid.

pub mod body;
pub mod channel;
pub mod composer;
pub mod offset;

pub use body::*;
pub use channel::*;
pub use composer::*;
pub use offset::*;
