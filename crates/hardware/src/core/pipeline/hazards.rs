//! Hazard Detection.
//!
//! This module implements the stall conditions of the pipeline as pure
//! functions over [`PipelineState`]. It provides:
//! 1. **Structural hazards:** Register-file write-port contention at writeback.
//! 2. **Data hazards:** Read-after-write checks at issue and at decode.
//! 3. **Control hazards:** Taken branches that block fetch.
//!
//! Each data-hazard check returns the length of the hazard-free prefix of its
//! queue: the number of instructions, from the head, that may advance this cycle.

use crate::config::PipelineConfig;
use crate::core::pipeline::latches::PipelineState;
use crate::isa::{DynInst, RegId};

/// Returns true if `a` precedes `b` in program order (a NOP `b` is always younger).
pub const fn is_older(a: &DynInst, b: &DynInst) -> bool {
    a.is_older_than(b)
}

fn writes(producer: &DynInst, reg: RegId) -> bool {
    producer.dest() == Some(reg)
}

fn reads_any<'a>(consumer: &DynInst, mut producers: impl Iterator<Item = &'a DynInst>) -> bool {
    producers.any(|p| consumer.sources().any(|reg| writes(p, reg)))
}

/// Both MEM slots hold an instruction with a destination register.
pub const fn write_port_contention(state: &PipelineState) -> bool {
    state.mem_alu.has_dest() && state.mem_lwsw.has_dest()
}

/// Both MEM slots write the same destination register.
pub fn same_destination(state: &PipelineState) -> bool {
    match (state.mem_alu.dest(), state.mem_lwsw.dest()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Checks whether writeback must retire only one of the two MEM slots this cycle.
///
/// Serialization is required when a single register-file write port is
/// configured and both slots write a register, or when both slots write the
/// same register regardless of the port count.
///
/// # Arguments
///
/// * `state` - The current pipeline registers.
/// * `config` - Pipeline configuration (for `regFileWritePorts`).
pub fn writeback_must_serialize(state: &PipelineState, config: &PipelineConfig) -> bool {
    (config.reg_file_write_ports == 1 && write_port_contention(state)) || same_destination(state)
}

/// Computes how many instructions at the head of ID may issue this cycle.
///
/// Each candidate is checked against the destinations of the instructions
/// ahead of it in ID, and against `MEM_lwsw` when that slot holds a load
/// (the one-cycle load-use gap that forwarding cannot hide).
///
/// # Returns
///
/// The count of instructions before the first dependent one.
pub fn issue_ready_count(state: &PipelineState) -> usize {
    let pending_load = state.mem_lwsw.is_load().then_some(&state.mem_lwsw);
    for (i, inst) in state.id_queue.iter().enumerate() {
        let ahead = state.id_queue.iter().take(i).chain(pending_load);
        if reads_any(inst, ahead) {
            return i;
        }
    }
    state.id_queue.len()
}

/// Computes how many instructions at the head of IF may move to ID this cycle.
///
/// Each candidate is always checked against the instructions ahead of it in
/// IF. Without forwarding it is also checked against every in-flight producer
/// (see [`PipelineState::in_flight`]).
///
/// # Arguments
///
/// * `state` - The current pipeline registers.
/// * `forwarding` - Whether results are bypassed between stages.
///
/// # Returns
///
/// The count of instructions before the first dependent one.
pub fn decode_ready_count(state: &PipelineState, forwarding: bool) -> usize {
    for (i, inst) in state.if_queue.iter().enumerate() {
        let ahead = state.if_queue.iter().take(i);
        let blocked = if forwarding {
            reads_any(inst, ahead)
        } else {
            reads_any(inst, ahead.chain(state.in_flight()))
        };
        if blocked {
            return i;
        }
    }
    state.if_queue.len()
}

/// Returns true if fetch must stop because of an unresolved taken branch.
///
/// Fetch is blocked by a taken branch in IF; in ID when there is no branch
/// target buffer; and in `EX_ALU` when there is no branch predictor.
pub fn control_hazard(state: &PipelineState, config: &PipelineConfig) -> bool {
    if state.if_queue.iter().any(DynInst::is_taken) {
        return true;
    }
    if !config.branch_target_buffer && state.id_queue.iter().any(DynInst::is_taken) {
        return true;
    }
    !config.branch_predictor && state.ex_alu.is_taken()
}

/// Returns true if fetch must stop because a load holds the unified memory port.
pub const fn memory_port_conflict(state: &PipelineState, config: &PipelineConfig) -> bool {
    !config.split_caches && state.mem_lwsw.is_load()
}
