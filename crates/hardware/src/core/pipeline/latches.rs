//! Pipeline register file.
//!
//! This module defines the state carried between the five stages:
//! Fetch → Decode → Issue → Memory → Writeback.
//!
//! 1. **Stage queues:** `IF`, `ID` and `WB` hold up to `pipelineWidth` instructions in program order.
//! 2. **Functional-unit slots:** `EX_ALU`/`MEM_ALU` and `EX_lwsw`/`MEM_lwsw` each hold one
//!    instruction; an empty slot holds [`DynInst::nop`].
//! 3. **Sequencing:** The next fetch sequence number and the last retired one.

use std::collections::VecDeque;

use crate::isa::DynInst;

/// All pipeline registers and queues of one simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineState {
    /// Fetched, waiting for decode.
    pub if_queue: VecDeque<DynInst>,
    /// Decoded, waiting for issue.
    pub id_queue: VecDeque<DynInst>,
    /// Instructions that left the pipeline this cycle (may contain NOP placeholders).
    pub wb_queue: Vec<DynInst>,
    /// ALU instruction in execute.
    pub ex_alu: DynInst,
    /// ALU instruction in memory.
    pub mem_alu: DynInst,
    /// Load/store instruction in execute.
    pub ex_lwsw: DynInst,
    /// Load/store instruction in memory.
    pub mem_lwsw: DynInst,
    /// Sequence number given to the next fetched instruction.
    pub next_seq: u64,
    /// Sequence number of the most recently retired instruction, 0 before the first.
    pub last_retired_seq: u64,
}

impl PipelineState {
    /// Creates an empty pipeline. The first fetched instruction gets sequence number 1.
    pub fn new() -> Self {
        Self {
            if_queue: VecDeque::new(),
            id_queue: VecDeque::new(),
            wb_queue: Vec::new(),
            ex_alu: DynInst::nop(),
            mem_alu: DynInst::nop(),
            ex_lwsw: DynInst::nop(),
            mem_lwsw: DynInst::nop(),
            next_seq: 1,
            last_retired_seq: 0,
        }
    }

    /// True once nothing is left in flight: IF and ID are empty and all four
    /// functional-unit slots hold NOPs.
    pub fn is_finished(&self) -> bool {
        self.if_queue.is_empty()
            && self.id_queue.is_empty()
            && self.ex_alu.is_nop()
            && self.mem_alu.is_nop()
            && self.ex_lwsw.is_nop()
            && self.mem_lwsw.is_nop()
    }

    /// Producers a decoding instruction must wait for without forwarding:
    /// everything in ID, both EX slots, both MEM slots, and the WB set.
    pub fn in_flight(&self) -> impl Iterator<Item = &DynInst> + '_ {
        self.id_queue
            .iter()
            .chain([&self.ex_alu, &self.ex_lwsw, &self.mem_alu, &self.mem_lwsw])
            .chain(self.wb_queue.iter())
    }

    /// Instructions that left the pipeline this cycle, NOP placeholders excluded.
    pub fn retired(&self) -> impl Iterator<Item = &DynInst> + '_ {
        self.wb_queue.iter().filter(|d| !d.is_nop())
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
