//! KINEMA Signal - per-channel smoothing and tracking confidence
//!
//! This crate implements the two leaf state machines every motion channel
//! is built from:
//! - `SmoothedSignal`: damped spring turning a jumpy target into a smooth value
//! - `ConfidenceRamp`: tracked/lost counters producing a [0,1] apply rate

pub mod confidence;
pub mod smoothed;

pub use confidence::*;
pub use smoothed::*;
