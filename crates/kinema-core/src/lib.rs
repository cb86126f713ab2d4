//! KINEMA Core - Fundamental types for avatar motion arbitration
//!
//! This crate defines the types shared by every KINEMA crate:
//! - Pose values and targets (LeftHand, RightHand, HeadLookAt, Body)
//! - Generator identities and the passive/active split
//! - Input events and continuous tracking samples
//! - Lean suggestions collected from unrelated subsystems
//! - Rest pose, motion mode and the error type

pub mod error;
pub mod event;
pub mod generator;
pub mod lean;
pub mod math;
pub mod mode;
pub mod pose;
pub mod rest;
pub mod target;

pub use error::*;
pub use event::*;
pub use generator::*;
pub use lean::*;
pub use math::*;
pub use mode::*;
pub use pose::*;
pub use rest::*;
pub use target::*;

pub use glam::{EulerRot, Quat, Vec2, Vec3};
