//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the five-stage instruction pipeline.
//! It includes the following components:
//! 1. **Hazards:** Detection of structural, data, and control hazards.
//! 2. **Latches:** The pipeline register file (IF/ID/WB queues and the four unit slots).
//! 3. **Stages:** Fetch, Decode, Issue, Memory, and Writeback.

/// Pipeline hazard detection.
pub mod hazards;

/// Pipeline registers and stage queues.
pub mod latches;

/// Pipeline stage implementations (fetch, decode, issue, memory, writeback).
pub mod stages;

pub use latches::PipelineState;
