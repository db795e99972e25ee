//! Issue (EX) Stage.
//!
//! Moves decoded instructions into the execute slots in program order. ALU
//! instructions go to `EX_ALU`, loads and stores to `EX_lwsw`. The first
//! instruction whose slot is occupied stops issue for the cycle, so younger
//! instructions never overtake it.

use crate::config::PipelineConfig;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::PipelineState;
use crate::stats::SimStats;

/// Executes the issue stage of the pipeline.
///
/// # Arguments
///
/// * `state` - Pipeline registers.
/// * `config` - Pipeline configuration.
/// * `stats` - Run statistics.
///
/// # Behavior
///
/// - With forwarding, only the hazard-free prefix of ID is eligible
/// - Without forwarding, all of ID is eligible (decode already waited)
/// - A NOP taken from the trace is dropped here and uses no slot
///
/// # Returns
///
/// The number of instructions that left ID.
pub fn issue_stage(state: &mut PipelineState, config: &PipelineConfig, stats: &mut SimStats) -> usize {
    let pending = state.id_queue.len();
    let ready = if config.enable_forwarding {
        hazards::issue_ready_count(state)
    } else {
        pending
    };

    let mut issued = 0;
    while issued < ready {
        let Some(head) = state.id_queue.front().copied() else {
            break;
        };
        let slot = if head.is_mem() {
            &mut state.ex_lwsw
        } else if head.is_alu() {
            &mut state.ex_alu
        } else {
            let _ = state.id_queue.pop_front();
            issued += 1;
            continue;
        };
        if !slot.is_nop() {
            break;
        }
        *slot = head;
        let _ = state.id_queue.pop_front();
        issued += 1;
    }

    if issued < pending {
        stats.stalls_issue += 1;
    }
    issued
}
