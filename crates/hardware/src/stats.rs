//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the pipeline simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, fetched and retired instructions, and CPI.
//! 2. **Stalls:** Fetch stalls by cause, decode data stalls, and issue stalls.
//! 3. **Memory latency:** Accumulated request latency per port.
//! 4. **Cache hierarchy:** Per-level hit/miss/writeback counts (see [`CacheStats`]).

/// Per-cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found their block resident.
    pub read_hits: u64,
    /// Reads that had to fetch from the lower level.
    pub read_misses: u64,
    /// Writes that found their block resident.
    pub write_hits: u64,
    /// Writes whose block was absent.
    pub write_misses: u64,
    /// Dirty victims sent to the lower level.
    pub writebacks: u64,
}

impl CacheStats {
    /// Demand accesses (reads and writes).
    pub const fn accesses(&self) -> u64 {
        self.read_hits + self.read_misses + self.write_hits + self.write_misses
    }

    /// Demand misses (reads and writes).
    pub const fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Fraction of demand accesses that hit, or `0.0` with no accesses.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            (total - self.misses()) as f64 / total as f64
        }
    }
}

/// Main memory counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Read requests served.
    pub reads: u64,
    /// Write requests absorbed.
    pub writes: u64,
    /// Writebacks absorbed.
    pub writebacks: u64,
}

impl MemoryStats {
    /// Total requests that reached memory.
    pub const fn total(&self) -> u64 {
        self.reads + self.writes + self.writebacks
    }
}

/// Simulation statistics structure tracking pipeline metrics.
///
/// Cache and memory counters live on the levels themselves; this structure
/// only holds what the pipeline observes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total simulated cycles.
    pub cycles: u64,
    /// Instructions pulled from the trace.
    pub instructions_fetched: u64,
    /// Instructions emitted by writeback (NOP placeholders excluded).
    pub instructions_retired: u64,

    /// Cycles where fetch was blocked by a taken branch.
    pub stalls_control: u64,
    /// Cycles where fetch was blocked by a load on the unified memory port.
    pub stalls_structural: u64,
    /// Cycles where decode left instructions in IF because of a data hazard.
    pub stalls_data: u64,
    /// Cycles where issue left instructions in ID.
    pub stalls_issue: u64,
    /// Cycles where writeback had to serialize the two MEM slots.
    pub stalls_writeback: u64,

    /// Requests sent to the instruction port.
    pub inst_requests: u64,
    /// Latency accumulated by instruction-port requests.
    pub inst_latency: u64,
    /// Requests sent to the data port.
    pub data_requests: u64,
    /// Latency accumulated by data-port requests.
    pub data_latency: u64,
}

impl SimStats {
    /// Cycles per retired instruction, or `0.0` before anything retires.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Retired instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Total memory latency over both ports.
    pub const fn total_latency(&self) -> u64 {
        self.inst_latency + self.data_latency
    }

    /// Prints the pipeline report to stdout.
    pub fn print(&self) {
        println!("\n==========================================================");
        println!("PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts_fetched        {}", self.instructions_fetched);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {:.4}", self.ipc());
        println!("sim_cpi                  {:.4}", self.cpi());
        println!("----------------------------------------------------------");
        println!("STALLS");
        println!("  fetch.control          {}", self.stalls_control);
        println!("  fetch.structural       {}", self.stalls_structural);
        println!("  decode.data            {}", self.stalls_data);
        println!("  issue                  {}", self.stalls_issue);
        println!("  writeback.serialized   {}", self.stalls_writeback);
        println!("----------------------------------------------------------");
        println!("MEMORY LATENCY");
        println!(
            "  inst_port              {} reqs, {} cycles",
            self.inst_requests, self.inst_latency
        );
        println!(
            "  data_port              {} reqs, {} cycles",
            self.data_requests, self.data_latency
        );
        println!("  total                  {} cycles", self.total_latency());
        println!("==========================================================");
    }
}
