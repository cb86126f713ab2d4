//! Latest-value slot
//!
//! A producer overwrites, the frame loop takes. Only the newest value
//! matters: an unread value replaced by a newer one is counted as dropped.
//! The consumer side never blocks; if the producer holds the lock the frame
//! simply sees nothing new this tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Slot counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub published: u64,
    /// Values replaced before they were taken
    pub dropped: u64,
    pub taken: u64,
    /// `take_latest` calls that found the lock busy
    pub contended: u64,
}

#[derive(Debug)]
struct SlotInner<T> {
    value: Mutex<Option<T>>,
    published: AtomicU64,
    dropped: AtomicU64,
    taken: AtomicU64,
    contended: AtomicU64,
}

/// Shared single-value buffer; clones refer to the same slot
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                value: Mutex::new(None),
                published: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
                taken: AtomicU64::new(0),
                contended: AtomicU64::new(0),
            }),
        }
    }

    /// Store `value`, replacing any unread one
    pub fn publish(&self, value: T) {
        let replaced = self.inner.value.lock().replace(value);
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        if replaced.is_some() {
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take the newest value without blocking
    pub fn take_latest(&self) -> Option<T> {
        let Some(mut guard) = self.inner.value.try_lock() else {
            self.inner.contended.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        let value = guard.take();
        if value.is_some() {
            self.inner.taken.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub fn has_value(&self) -> bool {
        self.inner
            .value
            .try_lock()
            .map_or(false, |guard| guard.is_some())
    }

    pub fn stats(&self) -> SlotStats {
        SlotStats {
            published: self.inner.published.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            taken: self.inner.taken.load(Ordering::Relaxed),
            contended: self.inner.contended.load(Ordering::Relaxed),
        }
    }

    /// True when no other handle to this slot exists
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }
}
