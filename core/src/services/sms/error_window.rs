//! Fixed-capacity window of recent send outcomes for one provider.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

const SUCCESS: u8 = 1;
const FAILURE: u8 = 0;

/// Ring buffer of the most recent `capacity` outcomes
///
/// Each slot is written independently and the write position is claimed
/// with a single `fetch_add`, so recording never takes a lock. A reader
/// racing a writer may see a slot that has been claimed but not yet
/// written; that slot counts as a success until the store lands.
#[derive(Debug)]
pub struct ErrorWindow {
    slots: Box<[AtomicU8]>,
    written: AtomicUsize,
}

impl ErrorWindow {
    /// Create a window holding `capacity` outcomes (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity)
            .map(|_| AtomicU8::new(SUCCESS))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            written: AtomicUsize::new(0),
        }
    }

    pub fn record_success(&self) {
        self.record(true);
    }

    pub fn record_failure(&self) {
        self.record(false);
    }

    /// Record one outcome, overwriting the oldest once full
    pub fn record(&self, success: bool) {
        let position = self.written.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let value = if success { SUCCESS } else { FAILURE };
        self.slots[position].store(value, Ordering::Relaxed);
    }

    /// Forget every recorded outcome
    pub fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        for slot in self.slots.iter() {
            slot.store(SUCCESS, Ordering::Relaxed);
        }
    }

    /// Failures divided by populated slots, 0.0 when nothing was recorded
    pub fn error_rate(&self) -> f64 {
        let populated = self.len();
        if populated == 0 {
            return 0.0;
        }
        let failures = self.slots[..populated]
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed) == FAILURE)
            .count();
        failures as f64 / populated as f64
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.written.load(Ordering::Relaxed).min(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
