//! Memory Access (MEM) Stage.
//!
//! Advances each functional unit's EX slot into its MEM slot when the MEM
//! slot is free. The two units move independently. A load or store that
//! enters `MEM_lwsw` sends one request to the data port; its latency is
//! recorded but does not hold the instruction back.

use std::mem;

use crate::common::{MemOp, MemRequest, SimResult};
use crate::core::pipeline::latches::PipelineState;
use crate::isa::DynInst;
use crate::soc::MemorySystem;
use crate::stats::SimStats;

/// Executes the memory stage of the pipeline.
///
/// # Arguments
///
/// * `state` - Pipeline registers.
/// * `memory` - Memory system; loads and stores go through the data port, if any.
/// * `stats` - Run statistics.
///
/// # Returns
///
/// The number of instructions promoted (0 to 2).
///
/// # Errors
///
/// Propagates memory hierarchy errors.
pub fn memory_stage(
    state: &mut PipelineState,
    memory: &mut MemorySystem,
    stats: &mut SimStats,
) -> SimResult<usize> {
    let mut promoted = 0;

    if state.mem_alu.is_nop() && !state.ex_alu.is_nop() {
        state.mem_alu = mem::replace(&mut state.ex_alu, DynInst::nop());
        promoted += 1;
    }

    if state.mem_lwsw.is_nop() && !state.ex_lwsw.is_nop() {
        let inst = mem::replace(&mut state.ex_lwsw, DynInst::nop());
        state.mem_lwsw = inst;
        promoted += 1;

        if let Some(port) = memory.data_port {
            let op = if inst.is_load() { MemOp::Read } else { MemOp::Write };
            let mut req = MemRequest::new(u64::from(inst.inst.addr), op);
            stats.data_latency += memory.access(port, &mut req)?;
            stats.data_requests += 1;
        }
    }

    Ok(promoted)
}
