//! Controller counters

use std::time::Duration;

/// Runtime statistics
#[derive(Debug, Clone, Default)]
pub struct MotionStats {
    pub ticks: u64,
    /// Ticks that ran with a model loaded
    pub frames: u64,
    pub events: u64,
    pub face_samples: u64,
    pub hand_frames: u64,
    /// Requests drained from the bus
    pub requests: u64,
    /// Requests dropped by mode gating or the priority table
    pub rejected_requests: u64,
    pub ownership_changes: u64,
    pub fallbacks: u64,
    pub skeleton_errors: u64,
    pub last_tick_duration: Duration,
}
