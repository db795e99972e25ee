//! Instruction Decode (ID) Stage.
//!
//! Moves instructions from IF to ID. With forwarding enabled decode never
//! stalls on data dependencies; without it, an instruction waits in IF until
//! every in-flight producer of its sources has left the pipeline.

use crate::config::PipelineConfig;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::PipelineState;
use crate::stats::SimStats;

/// Executes the decode stage of the pipeline.
///
/// # Arguments
///
/// * `state` - Pipeline registers.
/// * `config` - Pipeline configuration.
/// * `stats` - Run statistics.
///
/// # Returns
///
/// The number of instructions moved into ID, bounded by the hazard-free
/// prefix of IF and by the free room in ID.
pub fn decode_stage(state: &mut PipelineState, config: &PipelineConfig, stats: &mut SimStats) -> usize {
    let waiting = state.if_queue.len();
    let ready = if config.enable_forwarding {
        waiting
    } else {
        hazards::decode_ready_count(state, false)
    };

    let mut moved = 0;
    while moved < ready && state.id_queue.len() < config.pipeline_width {
        let Some(inst) = state.if_queue.pop_front() else {
            break;
        };
        state.id_queue.push_back(inst);
        moved += 1;
    }

    if ready < waiting && moved == ready {
        stats.stalls_data += 1;
    }
    moved
}
