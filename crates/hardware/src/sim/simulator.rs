//! Simulator: owns the pipeline, the memory system, and the trace side by side.
//!
//! Each [`Simulator::tick`] is one clock cycle. The stages run in reverse
//! pipeline order so every stage reads the registers as the previous cycle
//! left them, without snapshotting.

use std::fmt;

use tracing::debug;

use crate::common::SimResult;
use crate::config::{Config, PipelineConfig};
use crate::core::pipeline::PipelineState;
use crate::core::pipeline::stages::{
    decode_stage, fetch_stage, issue_stage, memory_stage, writeback_stage,
};
use crate::sim::trace::TraceSource;
use crate::soc::MemorySystem;
use crate::stats::SimStats;

/// Why [`Simulator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The trace was exhausted and every instruction left the pipeline.
    Completed,
    /// The cycle limit was reached first.
    CycleLimit,
}

/// Top-level simulator: pipeline registers + memory system + trace.
pub struct Simulator {
    /// Pipeline registers and queues.
    pub state: PipelineState,
    /// Caches, main memory, and the two ports.
    pub memory: MemorySystem,
    /// Pipeline-wide counters.
    pub stats: SimStats,
    config: PipelineConfig,
    diagnostics: bool,
    source: Box<dyn TraceSource>,
    max_cycles: Option<u64>,
}

impl Simulator {
    /// Creates a simulator from a configuration and a trace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::SimError::ConfigInvalid`] if the
    /// configuration fails validation or the memory system cannot be built.
    pub fn new(config: &Config, source: Box<dyn TraceSource>) -> SimResult<Self> {
        config.validate()?;
        let memory = MemorySystem::new(&config.memory)?;
        debug!(
            width = config.pipeline.pipeline_width,
            forwarding = config.pipeline.enable_forwarding,
            write_ports = config.pipeline.reg_file_write_ports,
            levels = memory.hierarchy.len(),
            "simulator ready"
        );
        Ok(Self {
            state: PipelineState::new(),
            memory,
            stats: SimStats::default(),
            config: config.pipeline.clone(),
            diagnostics: config.general.trace_instructions,
            source,
            max_cycles: None,
        })
    }

    /// Stops [`Simulator::run`] after `limit` cycles.
    #[must_use]
    pub const fn with_max_cycles(mut self, limit: u64) -> Self {
        self.max_cycles = Some(limit);
        self
    }

    /// Pipeline configuration in use.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// True once nothing is left in flight.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// # Returns
    ///
    /// The number of instructions fetched this cycle.
    ///
    /// # Errors
    ///
    /// Propagates trace, memory hierarchy, and invariant errors from the stages.
    pub fn tick(&mut self) -> SimResult<usize> {
        self.stats.cycles += 1;
        let _ = writeback_stage(&mut self.state, &self.config, &mut self.stats, self.diagnostics)?;
        let _ = memory_stage(&mut self.state, &mut self.memory, &mut self.stats)?;
        let _ = issue_stage(&mut self.state, &self.config, &mut self.stats);
        let _ = decode_stage(&mut self.state, &self.config, &mut self.stats);
        fetch_stage(
            &mut self.state,
            &self.config,
            self.source.as_mut(),
            &mut self.memory,
            &mut self.stats,
            self.diagnostics,
        )
    }

    /// Ticks until the trace is drained and the pipeline is empty.
    ///
    /// # Errors
    ///
    /// Stops at the first error raised by [`Simulator::tick`].
    pub fn run(&mut self) -> SimResult<RunOutcome> {
        loop {
            if self.max_cycles.is_some_and(|limit| self.stats.cycles >= limit) {
                debug!(cycles = self.stats.cycles, "cycle limit reached");
                return Ok(RunOutcome::CycleLimit);
            }
            let fetched = self.tick()?;
            if fetched == 0 && self.is_finished() {
                debug!(
                    cycles = self.stats.cycles,
                    retired = self.stats.instructions_retired,
                    "trace drained"
                );
                return Ok(RunOutcome::Completed);
            }
        }
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state)
            .field("memory", &self.memory)
            .field("stats", &self.stats)
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics)
            .field("max_cycles", &self.max_cycles)
            .finish_non_exhaustive()
    }
}
