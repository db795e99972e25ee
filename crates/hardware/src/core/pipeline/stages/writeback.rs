//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction pipeline. It
//! empties the two MEM slots into the WB set, oldest first. When the register
//! file cannot take both results this cycle, only the older instruction
//! leaves and a NOP placeholder takes the second WB position.

use std::mem;

use tracing::trace;

use crate::common::{SimError, SimResult};
use crate::config::PipelineConfig;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::PipelineState;
use crate::isa::DynInst;
use crate::stats::SimStats;

/// Executes the writeback stage of the pipeline.
///
/// # Arguments
///
/// * `state` - Pipeline registers.
/// * `config` - Pipeline configuration.
/// * `stats` - Run statistics.
/// * `diagnostics` - Emit a trace event per retired instruction and check
///   that sequence numbers retire in increasing order.
///
/// # Returns
///
/// The number of real instructions retired this cycle.
///
/// # Errors
///
/// In diagnostic mode, returns [`SimError::InvariantViolation`] if an
/// instruction retires out of order. The check runs only for a single-issue
/// pipeline, for any number of write ports: in wider pipelines a serialized
/// instruction can be overtaken by a younger one from the other unit.
pub fn writeback_stage(
    state: &mut PipelineState,
    config: &PipelineConfig,
    stats: &mut SimStats,
    diagnostics: bool,
) -> SimResult<usize> {
    state.wb_queue.clear();

    let alu_first = hazards::is_older(&state.mem_alu, &state.mem_lwsw);
    if hazards::writeback_must_serialize(state, config) {
        stats.stalls_writeback += 1;
        let older = if alu_first {
            &mut state.mem_alu
        } else {
            &mut state.mem_lwsw
        };
        let inst = mem::replace(older, DynInst::nop());
        state.wb_queue.extend([inst, DynInst::nop()]);
    } else {
        let alu = mem::replace(&mut state.mem_alu, DynInst::nop());
        let lwsw = mem::replace(&mut state.mem_lwsw, DynInst::nop());
        if alu_first {
            state.wb_queue.extend([alu, lwsw]);
        } else {
            state.wb_queue.extend([lwsw, alu]);
        }
    }

    let check_order = diagnostics && config.pipeline_width == 1;
    let mut retired = 0;
    for inst in state.wb_queue.iter().filter(|d| !d.is_nop()) {
        if diagnostics {
            trace!(cycle = stats.cycles, "[WB] {inst}");
        }
        if check_order && inst.seq <= state.last_retired_seq {
            return Err(SimError::invariant(format!(
                "instruction #{} retired after #{}",
                inst.seq, state.last_retired_seq
            )));
        }
        state.last_retired_seq = state.last_retired_seq.max(inst.seq);
        retired += 1;
    }

    stats.instructions_retired += retired as u64;
    Ok(retired)
}
