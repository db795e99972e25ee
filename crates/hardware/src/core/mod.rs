//! Core processor implementation.
//!
//! This module contains the instruction pipeline and the cache units the
//! memory hierarchy is built from.

/// Instruction pipeline implementation (stages, latches, hazards).
pub mod pipeline;

/// Cache units (storage, replacement policies, write-policy levels).
pub mod units;

pub use self::pipeline::PipelineState;
