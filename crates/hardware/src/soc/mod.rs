//! Memory-side Components.
//!
//! This module organizes everything below the pipeline: the main memory
//! device, the interconnect that links levels together, and the builder that
//! assembles them from configuration.

/// Memory system builder and port binding.
pub mod builder;

/// Level arena and request routing.
pub mod interconnect;

/// Main memory device.
pub mod memory;

pub use builder::MemorySystem;
pub use interconnect::{LevelId, MemoryHierarchy};
