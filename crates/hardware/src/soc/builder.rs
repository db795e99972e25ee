//! Memory system construction.
//!
//! This module builds the memory hierarchy from configuration. It performs:
//! 1. **Validation:** The memory section is validated before anything is built.
//! 2. **Level creation:** Each level is created after its lower level, so every
//!    [`LevelId`] a cache refers to already exists.
//! 3. **Port binding:** The instruction and data ports are resolved to level ids.

use std::collections::BTreeSet;

use tracing::debug;

use crate::common::{MemRequest, SimError, SimResult};
use crate::config::{LevelConfig, MemoryConfig};
use crate::core::units::cache::level::CacheLevel;
use crate::soc::interconnect::{Device, LevelId, MemoryHierarchy};
use crate::soc::memory::MainMemory;

/// The hierarchy plus the two entry points the pipeline uses.
#[derive(Debug)]
pub struct MemorySystem {
    /// All levels.
    pub hierarchy: MemoryHierarchy,
    /// Level serving instruction fetch, if configured.
    pub inst_port: Option<LevelId>,
    /// Level serving loads and stores, if configured.
    pub data_port: Option<LevelId>,
}

impl MemorySystem {
    /// Builds the hierarchy described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if the memory section fails validation.
    /// Nothing is built in that case.
    pub fn new(config: &MemoryConfig) -> SimResult<Self> {
        config.validate()?;

        let mut hierarchy = MemoryHierarchy::new();
        for name in config.levels.keys() {
            let _ = build_level(config, name, &mut hierarchy, &mut BTreeSet::new())?;
        }

        let resolve = |port: Option<&str>| -> SimResult<Option<LevelId>> {
            port.map(|name| {
                hierarchy
                    .id(name)
                    .ok_or_else(|| SimError::config(format!("port names unknown level `{name}`")))
            })
            .transpose()
        };
        let inst_port = resolve(config.instruction_port.as_deref())?;
        let data_port = resolve(config.data_port.as_deref())?;

        Ok(Self {
            hierarchy,
            inst_port,
            data_port,
        })
    }

    /// Sends a request to `port`.
    ///
    /// # Returns
    ///
    /// The latency the request accumulated on its way down.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by the hierarchy.
    pub fn access(&mut self, port: LevelId, req: &mut MemRequest) -> SimResult<u64> {
        self.hierarchy.access(port, req)?;
        Ok(req.latency())
    }

    /// Prints per-level counters to stdout.
    pub fn print_stats(&self) {
        println!("MEMORY HIERARCHY");
        for (_, device) in self.hierarchy.iter() {
            match device {
                Device::Cache(cache) => {
                    let s = cache.stats();
                    println!(
                        "  {:<8} {} {:>4}B x{}  rd {}/{}  wr {}/{}  wb {}  hit {:.2}%",
                        cache.name(),
                        cache.write_policy(),
                        cache.core().bsize(),
                        cache.core().assoc(),
                        s.read_hits,
                        s.read_hits + s.read_misses,
                        s.write_hits,
                        s.write_hits + s.write_misses,
                        s.writebacks,
                        s.hit_rate() * 100.0
                    );
                }
                Device::Memory(memory) => {
                    let s = memory.stats();
                    println!(
                        "  {:<8} reads {}  writes {}  writebacks {}",
                        memory.name(),
                        s.reads,
                        s.writes,
                        s.writebacks
                    );
                }
            }
        }
        println!("==========================================================");
    }
}

/// Creates `name` and everything below it, returning its id.
fn build_level(
    config: &MemoryConfig,
    name: &str,
    hierarchy: &mut MemoryHierarchy,
    visiting: &mut BTreeSet<String>,
) -> SimResult<LevelId> {
    if let Some(id) = hierarchy.id(name) {
        return Ok(id);
    }
    if !visiting.insert(name.to_string()) {
        return Err(SimError::config(format!("cyclic lowerLevel chain through `{name}`")));
    }
    let level = config
        .levels
        .get(name)
        .ok_or_else(|| SimError::config(format!("unknown memory level `{name}`")))?;

    let id = match level {
        LevelConfig::Memory(mem) => {
            debug!(level = name, hit_delay = mem.hit_delay, "main memory");
            hierarchy.add_memory(MainMemory::new(name, mem))?
        }
        LevelConfig::Cache(cache) => {
            let lower = build_level(config, &cache.lower_level, hierarchy, visiting)?;
            debug!(
                level = name,
                size = cache.size,
                assoc = cache.assoc,
                bsize = cache.bsize,
                write_policy = %cache.write_policy,
                repl_policy = %cache.repl_policy,
                lower = %cache.lower_level,
                "cache level"
            );
            hierarchy.add_cache(CacheLevel::new(name, cache)?, lower)?
        }
    };
    Ok(id)
}
