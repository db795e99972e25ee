//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the instruction pipeline.
//! It pulls static instructions from the trace, tags each with the next
//! sequence number, and queues them in IF. Fetch stops for the cycle when IF
//! is full, when a taken branch is unresolved, or when the trace runs out.

use tracing::trace;

use crate::common::{MemOp, MemRequest, SimResult};
use crate::config::PipelineConfig;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::PipelineState;
use crate::isa::DynInst;
use crate::sim::trace::TraceSource;
use crate::soc::MemorySystem;
use crate::stats::SimStats;

/// Executes the instruction fetch stage of the pipeline.
///
/// # Arguments
///
/// * `state` - Pipeline registers.
/// * `config` - Pipeline configuration.
/// * `source` - Trace to pull instructions from.
/// * `memory` - Memory system; each fetch reads its PC through the instruction port, if any.
/// * `stats` - Run statistics.
/// * `diagnostics` - Emit a trace event per fetched instruction.
///
/// # Behavior
///
/// - Does nothing while a load holds the unified memory port
/// - Fetches up to `pipelineWidth - IF.len()` instructions
/// - Stops at the first cycle position blocked by a control hazard
/// - End of trace is reported as fetching fewer (possibly zero) instructions
///
/// # Returns
///
/// The number of instructions fetched this cycle.
///
/// # Errors
///
/// Propagates trace decoding errors and memory hierarchy errors.
pub fn fetch_stage(
    state: &mut PipelineState,
    config: &PipelineConfig,
    source: &mut dyn TraceSource,
    memory: &mut MemorySystem,
    stats: &mut SimStats,
    diagnostics: bool,
) -> SimResult<usize> {
    if hazards::memory_port_conflict(state, config) {
        stats.stalls_structural += 1;
        return Ok(0);
    }

    let mut fetched = 0;
    while state.if_queue.len() < config.pipeline_width {
        if hazards::control_hazard(state, config) {
            stats.stalls_control += 1;
            break;
        }
        let Some(inst) = source.next_inst()? else {
            break;
        };

        let dinst = DynInst::new(inst, state.next_seq);
        state.next_seq += 1;

        if let Some(port) = memory.inst_port {
            let mut req = MemRequest::new(u64::from(inst.pc), MemOp::Read);
            stats.inst_latency += memory.access(port, &mut req)?;
            stats.inst_requests += 1;
        }
        if diagnostics {
            trace!(cycle = stats.cycles, "[IF] {dinst}");
        }

        state.if_queue.push_back(dinst);
        fetched += 1;
    }

    stats.instructions_fetched += fetched as u64;
    Ok(fetched)
}
