//! Cooperative-execution traits shared across the engine.

pub mod cancellation;
pub mod yield_point;

pub use cancellation::{Cancellable, CancellationToken};
pub use yield_point::{CountingYield, NoYield, YieldPoint};
