//! KINEMA Transport - the only concurrency boundary
//!
//! This crate provides:
//! - `LatestSlot`: single-value handoff from a producer thread to the frame loop
//! - Face tracker packet codec (text datagrams)
//! - UDP receive loop publishing decoded samples into a slot

pub mod packet;
pub mod slot;
pub mod udp;

pub use packet::*;
pub use slot::*;
pub use udp::*;
