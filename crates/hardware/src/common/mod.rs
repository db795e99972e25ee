//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by the pipeline and the
//! memory hierarchy:
//! 1. **Error Handling:** The `SimError` enum and the `SimResult` alias.
//! 2. **Memory Requests:** The request type that travels down the cache chain.

/// Error types for configuration, hierarchy, and invariant failures.
pub mod error;

/// Memory request definitions.
pub mod request;

pub use error::{SimError, SimResult};
pub use request::{MemOp, MemRequest};
