//! Ownership request bus
//!
//! Synchronous publish/drain queue. Generators publish while handling
//! events; the controller drains once per frame and hands each target's
//! requests to its arbiter through the priority table.

use kinema_core::{GeneratorKind, Target};

/// "I have fresh activity for this target"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnershipRequest {
    pub target: Target,
    pub generator: GeneratorKind,
}

/// Per-frame request queue
#[derive(Debug, Default)]
pub struct RequestBus {
    requests: Vec<OwnershipRequest>,
    published_total: u64,
}

impl RequestBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, target: Target, generator: GeneratorKind) {
        self.published_total += 1;
        self.requests.push(OwnershipRequest { target, generator });
    }

    /// Publish the same generator for several targets
    pub fn publish_all(&mut self, targets: &[Target], generator: GeneratorKind) {
        for &target in targets {
            self.publish(target, generator);
        }
    }

    /// Take every pending request, in publish order
    pub fn drain(&mut self) -> Vec<OwnershipRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Generators that asked for `target`, in publish order, without duplicates
    pub fn requesters(requests: &[OwnershipRequest], target: Target) -> Vec<GeneratorKind> {
        let mut out: Vec<GeneratorKind> = Vec::new();
        for r in requests.iter().filter(|r| r.target == target) {
            if !out.contains(&r.generator) {
                out.push(r.generator);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn published_total(&self) -> u64 {
        self.published_total
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}
