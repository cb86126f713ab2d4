//! KINEMA Test Harness - deterministic frame simulation
//!
//! This crate provides:
//! - A recording skeleton with a configurable rest pose
//! - Seeded input jitter (frame time, sensor noise, tracking dropout)
//! - A frame simulator driving `IntegratedMotionController`

pub mod jitter;
pub mod rig;
pub mod simulator;

pub use jitter::*;
pub use rig::*;
pub use simulator::*;
