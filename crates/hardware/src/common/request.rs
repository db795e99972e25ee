//! Memory request passed between the pipeline and the memory hierarchy.

use std::fmt;

/// Operation carried by a memory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemOp {
    /// Demand read (load, instruction fetch, or write-miss block fetch).
    Read,
    /// Demand write (store).
    Write,
    /// A dirty line evicted by a higher level.
    WriteBack,
}

impl fmt::Display for MemOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "MemRead"),
            Self::Write => write!(f, "MemWrite"),
            Self::WriteBack => write!(f, "MemWriteBack"),
        }
    }
}

/// A single request travelling down the memory hierarchy.
///
/// Latency only grows as the request passes through levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemRequest {
    addr: u64,
    op: MemOp,
    latency: u64,
}

impl MemRequest {
    /// Creates a request with zero accumulated latency.
    pub const fn new(addr: u64, op: MemOp) -> Self {
        Self {
            addr,
            op,
            latency: 0,
        }
    }

    /// Target address.
    pub const fn addr(&self) -> u64 {
        self.addr
    }

    /// Current operation.
    pub const fn op(&self) -> MemOp {
        self.op
    }

    /// Latency accumulated so far, in cycles.
    pub const fn latency(&self) -> u64 {
        self.latency
    }

    /// Adds a level's delay to the accumulated latency.
    pub const fn add_latency(&mut self, cycles: u64) {
        self.latency = self.latency.saturating_add(cycles);
    }

    /// Turns a write into a read so a write-allocate miss can fetch the block.
    pub const fn mutate_write_to_read(&mut self) {
        if matches!(self.op, MemOp::Write) {
            self.op = MemOp::Read;
        }
    }
}
