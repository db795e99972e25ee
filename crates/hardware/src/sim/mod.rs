//! Simulation driver and instruction input.
//!
//! Provides the trace sources that feed fetch and the [`Simulator`] that
//! advances the pipeline one cycle at a time.

/// Cycle driver.
pub mod simulator;

/// Trace sources (in-memory and binary files).
pub mod trace;

pub use simulator::{RunOutcome, Simulator};
pub use trace::{BinaryTrace, TraceSource, VecTrace};
