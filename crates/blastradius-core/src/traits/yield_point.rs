//! Cooperative yield points for long-running single-threaded loops.

use std::cell::Cell;

/// Hand control back to the host scheduler.
///
/// Full rebuilds and multi-file patches call this every
/// `batch_yield_size` files so a single-event-loop host stays responsive.
/// The engine never spawns threads; the host decides what "yield" means.
pub trait YieldPoint {
    fn yield_now(&self);
}

/// No-op yield for hosts that do not need batching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl YieldPoint for NoYield {
    fn yield_now(&self) {}
}

/// Test double that counts how often the loop yielded.
#[derive(Debug, Default)]
pub struct CountingYield {
    count: Cell<u32>,
}

impl CountingYield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }
}

impl YieldPoint for CountingYield {
    fn yield_now(&self) {
        self.count.set(self.count.get() + 1);
    }
}
