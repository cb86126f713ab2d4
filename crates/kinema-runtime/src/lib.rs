//! KINEMA Runtime - the per-frame motion loop
//!
//! `IntegratedMotionController` runs five stages every frame:
//! 1. Ingest requests (face feed, generator ticks, request bus, priority)
//! 2. Track owner freshness and assign passive fallbacks
//! 3. Resolve every target arbiter
//! 4. Compose the body lean and offset
//! 5. Apply poses to the skeleton

pub mod config;
pub mod controller;
pub mod observability;
pub mod skeleton;
pub mod stats;

pub use config::*;
pub use controller::*;
pub use observability::*;
pub use skeleton::*;
pub use stats::*;
