// =============================================================================
// Instrumentation Counters
// =============================================================================
//
// Auxiliary tick counters used for observability only. Nothing on the decay
// path reads them back, so the non-atomic fallback is valid whenever the
// owning engine never leaves its thread.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing event counter.
pub trait TickCounter: Default {
    fn add(&self, n: u64);

    fn get(&self) -> u64;

    fn reset(&self);

    #[inline]
    fn increment(&self) {
        self.add(1);
    }
}

/// Lock-free counter, safe to read from other threads.
#[derive(Debug, Default)]
pub struct AtomicTickCounter(AtomicU64);

impl TickCounter for AtomicTickCounter {
    #[inline]
    fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Single-threaded counter. `!Sync`, so an engine built with it stays on one
/// thread.
#[derive(Debug, Default)]
pub struct LocalTickCounter(Cell<u64>);

impl TickCounter for LocalTickCounter {
    #[inline]
    fn add(&self, n: u64) {
        self.0.set(self.0.get().wrapping_add(n));
    }

    #[inline]
    fn get(&self) -> u64 {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(0);
    }
}
