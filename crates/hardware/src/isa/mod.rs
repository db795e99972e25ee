//! Instruction model consumed by the pipeline.
//!
//! The simulator is trace-driven, so there is no encoding to decode. This
//! module only describes instruction classes, their operand shapes, and the
//! dynamic wrapper that carries a sequence number through the pipeline.

/// Static and dynamic instruction types and operand predicates.
pub mod instruction;

pub use instruction::{DynInst, INSTRUCTION_SIZE, InstKind, RegId, StaticInst};
