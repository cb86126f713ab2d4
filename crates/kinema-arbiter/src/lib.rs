//! KINEMA Arbiter - which generator drives each target
//!
//! One `TargetArbiter` per target owns the current generator and blends
//! from the previous one over a fixed duration when ownership changes.
//! Generators do not own targets by polling: they publish an
//! `OwnershipRequest` on the `RequestBus` when they see fresh, relevant
//! activity, and same-frame conflicts resolve through the `PriorityTable`.

pub mod arbiter;
pub mod bus;
pub mod generator;
pub mod priority;

pub use arbiter::*;
pub use bus::*;
pub use generator::*;
pub use priority::*;
