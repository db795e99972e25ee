//! Cycle-level pipeline and cache hierarchy simulator library.
//!
//! This crate implements a trace-driven five-stage in-order pipeline with the following:
//! 1. **Core:** Fetch, decode, issue, memory, and writeback stages with hazard detection.
//! 2. **Caches:** Set-associative storage with LRU or random replacement.
//! 3. **Memory:** Write-back and write-through levels chained down to main memory.
//! 4. **ISA:** Instruction classes, operand predicates, and sequence numbering.
//! 5. **Simulation:** Trace sources, configuration, the cycle driver, and statistics.

/// Common types (errors, memory requests).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Pipeline and cache units.
pub mod core;
/// Instruction classes and dynamic instructions.
pub mod isa;
/// Trace sources and the cycle driver.
pub mod sim;
/// Memory hierarchy (main memory, level arena, builder).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Error type and result alias used by every fallible operation.
pub use crate::common::{SimError, SimResult};
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Cycle driver; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Memory hierarchy plus its instruction and data ports.
pub use crate::soc::MemorySystem;
