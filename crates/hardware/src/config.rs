//! Configuration system for the pipeline simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** A baseline machine (single-issue pipeline, split L1, unified L2, main memory).
//! 2. **Structures:** Pipeline keys and one section per memory level, keyed by level name.
//! 3. **Enums:** Replacement policy and write policy, parsed case-insensitively.
//! 4. **Validation:** Fail-fast checks run before any simulator state is built.
//!
//! Configuration is supplied as JSON. Keys use camelCase names
//! (`pipelineWidth`, `hitDelay`, `bsize`, ...).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::error::Category;

use crate::common::{SimError, SimResult};

/// Default configuration constants for the simulator.
mod defaults {
    /// Instructions fetched, decoded, and issued per cycle.
    pub const PIPELINE_WIDTH: usize = 1;

    /// Register file write ports.
    pub const REG_FILE_WRITE_PORTS: usize = 2;

    /// L1 size in bytes (1 KiB).
    pub const L1_SIZE: usize = 1024;

    /// L1 associativity.
    pub const L1_ASSOC: usize = 2;

    /// L2 size in bytes (16 KiB).
    pub const L2_SIZE: usize = 16 * 1024;

    /// L2 associativity.
    pub const L2_ASSOC: usize = 4;

    /// Line size in bytes for every cache level.
    pub const LINE_SIZE: usize = 32;

    /// L1 hit latency in cycles.
    pub const L1_HIT_DELAY: u64 = 1;

    /// L2 hit latency in cycles.
    pub const L2_HIT_DELAY: u64 = 10;

    /// Main memory latency in cycles.
    pub const MEMORY_DELAY: u64 = 100;
}

/// Cache replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ReplacementPolicy {
    /// Evict the line with the greatest age (probes since its last hit).
    #[default]
    Lru,
    /// Evict a pseudo-randomly chosen way once the set is full.
    Random,
}

impl ReplacementPolicy {
    fn from_name(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("LRU") {
            Ok(Self::Lru)
        } else if s.eq_ignore_ascii_case("RANDOM") {
            Ok(Self::Random)
        } else {
            Err(format!("unknown replacement policy `{s}` (expected LRU or RANDOM)"))
        }
    }
}

impl FromStr for ReplacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).map_err(SimError::ConfigInvalid)
    }
}

impl TryFrom<String> for ReplacementPolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_name(&s)
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => f.write_str("LRU"),
            Self::Random => f.write_str("RANDOM"),
        }
    }
}

/// How a cache level treats writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum WritePolicy {
    /// Writes stay in the cache and mark the line dirty; allocate on write miss.
    #[default]
    WriteBack,
    /// Every write is propagated to the lower level; lines are never dirty.
    WriteThrough,
}

impl WritePolicy {
    fn from_name(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("WB") || s.eq_ignore_ascii_case("writeBack") {
            Ok(Self::WriteBack)
        } else if s.eq_ignore_ascii_case("WT") || s.eq_ignore_ascii_case("writeThrough") {
            Ok(Self::WriteThrough)
        } else {
            Err(format!("unknown write policy `{s}` (expected WB or WT)"))
        }
    }
}

impl FromStr for WritePolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).map_err(SimError::ConfigInvalid)
    }
}

impl TryFrom<String> for WritePolicy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_name(&s)
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteBack => f.write_str("WB"),
            Self::WriteThrough => f.write_str("WT"),
        }
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use pipesim_core::config::{Config, LevelConfig, WritePolicy};
///
/// let json = r#"{
///     "pipeline": {
///         "pipelineWidth": 2,
///         "enableForwarding": true,
///         "regFileWritePorts": 1,
///         "splitCaches": true,
///         "branchTargetBuffer": false,
///         "branchPredictor": false
///     },
///     "memory": {
///         "dataPort": "DL1",
///         "levels": {
///             "DL1": {
///                 "deviceType": "cache",
///                 "writePolicy": "WB",
///                 "hitDelay": 1,
///                 "size": 64,
///                 "assoc": 1,
///                 "bsize": 16,
///                 "replPolicy": "lru",
///                 "lowerLevel": "Memory"
///             },
///             "Memory": { "deviceType": "memory", "hitDelay": 100 }
///         }
///     }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.pipeline.pipeline_width, 2);
/// match &config.memory.levels["DL1"] {
///     LevelConfig::Cache(c) => assert_eq!(c.write_policy, WritePolicy::WriteBack),
///     LevelConfig::Memory(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Pipeline structure and hazard options
    pub pipeline: PipelineConfig,
    /// Memory hierarchy
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] when the text is not well-formed JSON and
    /// [`SimError::ConfigInvalid`] for missing keys, unknown names, or values that
    /// fail validation.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => SimError::config(e.to_string()),
            Category::Io | Category::Syntax | Category::Eof => SimError::ConfigParse(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`Config::from_json_str`], plus [`SimError::Io`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every constraint that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] naming the first offending section and key.
    pub fn validate(&self) -> SimResult<()> {
        self.pipeline.validate()?;
        self.memory.validate()
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    /// Emit per-instruction trace events and check retire order.
    #[serde(default)]
    pub trace_instructions: bool,
}

/// Pipeline structure and hazard-resolution options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Instructions moved per stage per cycle; also the IF/ID queue capacity.
    pub pipeline_width: usize,
    /// Bypass results between stages instead of waiting for writeback.
    pub enable_forwarding: bool,
    /// Register file write ports; with one port, two writers serialize.
    pub reg_file_write_ports: usize,
    /// Separate instruction and data memory paths.
    pub split_caches: bool,
    /// Taken branches redirect fetch from decode.
    pub branch_target_buffer: bool,
    /// Taken branches redirect fetch without waiting for execute.
    pub branch_predictor: bool,
}

impl PipelineConfig {
    /// Checks that the width and write-port counts are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if either count is zero.
    pub fn validate(&self) -> SimResult<()> {
        if self.pipeline_width == 0 {
            return Err(SimError::config("pipeline.pipelineWidth must be at least 1"));
        }
        if self.reg_file_write_ports == 0 {
            return Err(SimError::config(
                "pipeline.regFileWritePorts must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline_width: defaults::PIPELINE_WIDTH,
            enable_forwarding: true,
            reg_file_write_ports: defaults::REG_FILE_WRITE_PORTS,
            split_caches: true,
            branch_target_buffer: false,
            branch_predictor: false,
        }
    }
}

/// Memory hierarchy: named levels plus the pipeline's entry points.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Level that serves instruction fetch, if any.
    #[serde(default)]
    pub instruction_port: Option<String>,
    /// Level that serves loads and stores, if any.
    #[serde(default)]
    pub data_port: Option<String>,
    /// One section per level, keyed by level name.
    #[serde(default)]
    pub levels: BTreeMap<String, LevelConfig>,
}

impl MemoryConfig {
    /// Checks every level's geometry, every `lowerLevel` chain, and both ports.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] for the first broken level or port.
    pub fn validate(&self) -> SimResult<()> {
        for (name, level) in &self.levels {
            if let LevelConfig::Cache(cache) = level {
                cache.validate(name)?;
                self.check_chain(name)?;
            }
        }
        for (key, port) in [
            ("instructionPort", &self.instruction_port),
            ("dataPort", &self.data_port),
        ] {
            if let Some(port) = port {
                if !self.levels.contains_key(port) {
                    return Err(SimError::config(format!(
                        "memory.{key} names unknown level `{port}`"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Follows `lowerLevel` links from `start` until a memory device is reached.
    fn check_chain(&self, start: &str) -> SimResult<()> {
        let mut seen = BTreeSet::new();
        let mut current = start;
        loop {
            if !seen.insert(current) {
                return Err(SimError::config(format!(
                    "memory level `{start}` has a cyclic lowerLevel chain through `{current}`"
                )));
            }
            match self.levels.get(current) {
                Some(LevelConfig::Memory(_)) => return Ok(()),
                Some(LevelConfig::Cache(cache)) => current = cache.lower_level.as_str(),
                None => {
                    return Err(SimError::config(format!(
                        "lowerLevel `{current}` reached from `{start}` is not a configured level"
                    )));
                }
            }
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        let l1 = |hit_delay| CacheConfig {
            write_policy: WritePolicy::WriteBack,
            hit_delay,
            size: defaults::L1_SIZE,
            assoc: defaults::L1_ASSOC,
            bsize: defaults::LINE_SIZE,
            repl_policy: ReplacementPolicy::Lru,
            lower_level: "L2".to_string(),
        };
        let mut levels = BTreeMap::new();
        let _ = levels.insert(
            "IL1".to_string(),
            LevelConfig::Cache(l1(defaults::L1_HIT_DELAY)),
        );
        let _ = levels.insert(
            "DL1".to_string(),
            LevelConfig::Cache(l1(defaults::L1_HIT_DELAY)),
        );
        let _ = levels.insert(
            "L2".to_string(),
            LevelConfig::Cache(CacheConfig {
                write_policy: WritePolicy::WriteBack,
                hit_delay: defaults::L2_HIT_DELAY,
                size: defaults::L2_SIZE,
                assoc: defaults::L2_ASSOC,
                bsize: defaults::LINE_SIZE,
                repl_policy: ReplacementPolicy::Lru,
                lower_level: "Memory".to_string(),
            }),
        );
        let _ = levels.insert(
            "Memory".to_string(),
            LevelConfig::Memory(MainMemoryConfig {
                hit_delay: defaults::MEMORY_DELAY,
            }),
        );
        Self {
            instruction_port: Some("IL1".to_string()),
            data_port: Some("DL1".to_string()),
            levels,
        }
    }
}

/// One memory level section, selected by its `deviceType` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "deviceType")]
pub enum LevelConfig {
    /// A set-associative cache chained to a lower level.
    #[serde(rename = "cache", alias = "Cache", alias = "CACHE")]
    Cache(CacheConfig),
    /// The main-memory stand-in that terminates every chain.
    #[serde(rename = "memory", alias = "Memory", alias = "MEMORY")]
    Memory(MainMemoryConfig),
}

/// Individual cache level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Write-back or write-through
    pub write_policy: WritePolicy,
    /// Latency added to every request that reaches this level
    pub hit_delay: u64,
    /// Total capacity in bytes
    pub size: usize,
    /// Associativity (lines per set)
    pub assoc: usize,
    /// Line size in bytes
    pub bsize: usize,
    /// Victim selection policy
    pub repl_policy: ReplacementPolicy,
    /// Name of the next level down
    pub lower_level: String,
}

impl CacheConfig {
    /// Number of line slots.
    pub const fn num_lines(&self) -> usize {
        self.size / self.bsize
    }

    /// Checks the geometry and chain link of the level called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] for a bad geometry (see
    /// [`CacheConfig::validate_geometry`]) or a level that names itself as
    /// its lower level.
    pub fn validate(&self, name: &str) -> SimResult<()> {
        self.validate_geometry(name)?;
        if self.lower_level == name {
            return Err(SimError::config(format!(
                "{name}.lowerLevel refers to itself"
            )));
        }
        Ok(())
    }

    /// Checks that `size`, `assoc`, and `bsize` describe whole lines and sets.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] for a zero dimension or a size that
    /// is not a whole number of lines or sets.
    pub fn validate_geometry(&self, name: &str) -> SimResult<()> {
        for (key, value) in [("size", self.size), ("assoc", self.assoc), ("bsize", self.bsize)] {
            if value == 0 {
                return Err(SimError::config(format!("{name}.{key} must be positive")));
            }
        }
        if self.size % self.bsize != 0 {
            return Err(SimError::config(format!(
                "{name}.size ({}) is not a multiple of bsize ({})",
                self.size, self.bsize
            )));
        }
        if self.num_lines() % self.assoc != 0 {
            return Err(SimError::config(format!(
                "{name}: {} lines cannot be split into sets of {}",
                self.num_lines(),
                self.assoc
            )));
        }
        Ok(())
    }
}

/// Main memory configuration. Memory terminates the chain, so `lowerLevel` is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MainMemoryConfig {
    /// Access latency in cycles
    pub hit_delay: u64,
}
