//! Main Memory.
//!
//! The last level of every hierarchy. It always "hits": each request pays the
//! configured delay and is counted by operation. No data is stored.

use tracing::trace;

use crate::common::{MemOp, MemRequest};
use crate::config::MainMemoryConfig;
use crate::stats::MemoryStats;

/// Main memory stand-in at the bottom of the hierarchy.
#[derive(Debug, Clone)]
pub struct MainMemory {
    name: String,
    hit_delay: u64,
    stats: MemoryStats,
}

impl MainMemory {
    /// Creates a memory device.
    ///
    /// # Arguments
    ///
    /// * `name` - Section name, used in reports.
    /// * `config` - Memory parameters.
    pub fn new(name: impl Into<String>, config: &MainMemoryConfig) -> Self {
        Self {
            name: name.into(),
            hit_delay: config.hit_delay,
            stats: MemoryStats::default(),
        }
    }

    /// Section name of this device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latency added to every request.
    pub const fn hit_delay(&self) -> u64 {
        self.hit_delay
    }

    /// Request counters.
    pub const fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    /// Serves a request: adds the delay and counts it.
    pub fn access(&mut self, req: &mut MemRequest) {
        req.add_latency(self.hit_delay);
        trace!(level = %self.name, op = %req.op(), addr = req.addr(), "memory access");
        match req.op() {
            MemOp::Read => self.stats.reads += 1,
            MemOp::Write => self.stats.writes += 1,
            MemOp::WriteBack => self.stats.writebacks += 1,
        }
    }
}
