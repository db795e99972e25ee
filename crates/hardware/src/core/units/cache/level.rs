//! Cache Level.
//!
//! Wraps a [`CacheCore`] with a write policy and hit/miss accounting. A level
//! never owns the level below it: every access takes a `lower` callback that
//! forwards a request one step down the hierarchy. The hierarchy supplies
//! that callback (see [`crate::soc::interconnect`]).
//!
//! # Write policies
//!
//! 1. **Write-back:** write hits mark the line dirty; write misses fetch the
//!    block as a read, allocate it, and mark it dirty. Dirty victims are
//!    written back to the lower level before their line is reused.
//! 2. **Write-through:** every write is forwarded downward; lines never
//!    become dirty, so a write-through level must never receive a writeback.

use tracing::trace;

use super::CacheCore;
use crate::common::{MemOp, MemRequest, SimError, SimResult};
use crate::config::{CacheConfig, WritePolicy};
use crate::stats::CacheStats;

/// Forwards a request to the next level down.
pub type Lower<'a> = dyn FnMut(&mut MemRequest) -> SimResult<()> + 'a;

/// One cache in the hierarchy.
#[derive(Debug)]
pub struct CacheLevel {
    name: String,
    write_policy: WritePolicy,
    hit_delay: u64,
    core: CacheCore,
    stats: CacheStats,
}

impl CacheLevel {
    /// Creates an empty cache level.
    ///
    /// # Arguments
    ///
    /// * `name` - Section name, used in diagnostics and reports.
    /// * `config` - Cache parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if `config` fails
    /// [`CacheConfig::validate`] for this level's name.
    pub fn new(name: impl Into<String>, config: &CacheConfig) -> SimResult<Self> {
        let name = name.into();
        config.validate(&name)?;
        Ok(Self {
            name,
            write_policy: config.write_policy,
            hit_delay: config.hit_delay,
            core: CacheCore::new(config)?,
            stats: CacheStats::default(),
        })
    }

    /// Section name of this level.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured write policy.
    pub const fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Latency this level adds to every request.
    pub const fn hit_delay(&self) -> u64 {
        self.hit_delay
    }

    /// Hit/miss/writeback counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Underlying tag store.
    pub const fn core(&self) -> &CacheCore {
        &self.core
    }

    /// Serves one request.
    ///
    /// Adds the hit delay, then dispatches on the request's operation and the
    /// level's write policy. Misses and writebacks reach the level below
    /// through `lower` before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IllegalWriteBack`] if a write-through level
    /// receives a writeback, [`SimError::InvariantViolation`] if allocation
    /// breaks its contract, and any error raised below.
    pub fn access(&mut self, req: &mut MemRequest, lower: &mut Lower<'_>) -> SimResult<()> {
        req.add_latency(self.hit_delay);
        trace!(level = %self.name, op = %req.op(), addr = req.addr(), "cache access");

        match (self.write_policy, req.op()) {
            (_, MemOp::Read) => self.read(req, lower),
            (WritePolicy::WriteBack, MemOp::Write) => self.write_back_write(req, lower),
            (WritePolicy::WriteBack, MemOp::WriteBack) => self.absorb_writeback(req, lower),
            (WritePolicy::WriteThrough, MemOp::Write) => self.write_through_write(req, lower),
            (WritePolicy::WriteThrough, MemOp::WriteBack) => Err(SimError::IllegalWriteBack {
                level: self.name.clone(),
                addr: req.addr(),
            }),
        }
    }

    fn read(&mut self, req: &mut MemRequest, lower: &mut Lower<'_>) -> SimResult<()> {
        if self.core.access_line(req.addr())?.is_some() {
            self.stats.read_hits += 1;
            return Ok(());
        }
        self.stats.read_misses += 1;
        lower(req)?;
        let _ = self.fill(req.addr(), lower)?;
        Ok(())
    }

    fn write_back_write(&mut self, req: &mut MemRequest, lower: &mut Lower<'_>) -> SimResult<()> {
        let index = match self.core.access_line(req.addr())? {
            Some(index) => {
                self.stats.write_hits += 1;
                index
            }
            None => {
                self.stats.write_misses += 1;
                req.mutate_write_to_read();
                lower(req)?;
                self.fill(req.addr(), lower)?
            }
        };
        self.mark_dirty(index)
    }

    fn absorb_writeback(&mut self, req: &mut MemRequest, lower: &mut Lower<'_>) -> SimResult<()> {
        match self.core.access_line(req.addr())? {
            Some(index) => self.mark_dirty(index),
            None => lower(req),
        }
    }

    fn write_through_write(&mut self, req: &mut MemRequest, lower: &mut Lower<'_>) -> SimResult<()> {
        if self.core.access_line(req.addr())?.is_some() {
            self.stats.write_hits += 1;
        } else {
            self.stats.write_misses += 1;
        }
        lower(req)
    }

    /// Allocates a line for `addr`, writing back a dirty victim first.
    fn fill(&mut self, addr: u64, lower: &mut Lower<'_>) -> SimResult<usize> {
        let alloc = self.core.allocate_line(addr)?;

        if let Some(victim) = alloc.dirty_victim {
            if self.write_policy == WritePolicy::WriteThrough {
                return Err(SimError::invariant(format!(
                    "write-through level `{}` evicted dirty block {victim:#x}",
                    self.name
                )));
            }
            self.stats.writebacks += 1;
            trace!(level = %self.name, victim, "writeback");
            let mut wb = MemRequest::new(victim, MemOp::WriteBack);
            lower(&mut wb)?;
        }

        match self.core.line(alloc.index) {
            Some(line) if line.is_valid() => Ok(alloc.index),
            _ => Err(SimError::invariant(format!(
                "level `{}` allocated line {} for {addr:#x} but it is not valid",
                self.name, alloc.index
            ))),
        }
    }

    fn mark_dirty(&mut self, index: usize) -> SimResult<()> {
        match self.core.line_mut(index) {
            Some(line) if line.is_valid() => {
                line.mark_dirty();
                Ok(())
            }
            _ => Err(SimError::invariant(format!(
                "level `{}` tried to dirty invalid line {index}",
                self.name
            ))),
        }
    }
}
