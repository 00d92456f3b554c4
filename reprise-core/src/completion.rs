//! One-shot "episode watched" detection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Session-scoped completion flag, shared with whoever needs to know that
/// the current load was already marked.
#[derive(Debug, Clone, Default)]
pub struct CompletionLatch(Arc<AtomicBool>);

impl CompletionLatch {
    /// Unset latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current load was already marked.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag; returns `true` only for the caller that flipped it.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Clear for a new load.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Watches time updates for the completion threshold.
#[derive(Debug)]
pub struct CompletionTracker {
    threshold: f64,
    marked: bool,
    latch: CompletionLatch,
}

impl CompletionTracker {
    /// Tracker that fires at `threshold` (a fraction of the duration).
    pub fn new(threshold: f64, latch: CompletionLatch) -> Self {
        Self {
            threshold,
            marked: false,
            latch,
        }
    }

    /// Shared flag this tracker sets.
    pub fn latch(&self) -> &CompletionLatch {
        &self.latch
    }

    /// Either flag is set.
    pub fn is_marked(&self) -> bool {
        self.marked || self.latch.is_set()
    }

    /// Feed a time update. Returns `true` exactly once per load, on the
    /// first crossing of the threshold.
    pub fn observe(&mut self, current_time: f64, duration: f64) -> bool {
        let fraction = if duration > 0.0 {
            current_time / duration
        } else {
            0.0
        };
        if fraction < self.threshold || self.is_marked() {
            return false;
        }
        self.marked = true;
        self.latch.set()
    }

    /// New episode load.
    pub fn reset(&mut self) {
        self.marked = false;
        self.latch.reset();
    }
}
