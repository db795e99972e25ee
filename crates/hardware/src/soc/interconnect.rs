//! Memory hierarchy interconnect.
//!
//! This module routes requests between memory levels. It provides:
//! 1. **Level arena:** Caches and main memory are stored by index ([`LevelId`]);
//!    each cache records the id of its lower level, so split L1s can share one L2.
//! 2. **Access routing:** [`MemoryHierarchy::access`] serves a request at one
//!    level and lets that level forward misses and writebacks downward.
//! 3. **Inspection:** Levels can be looked up by name or id for statistics and tests.

use std::collections::HashMap;
use std::fmt;

use crate::common::{MemRequest, SimError, SimResult};
use crate::core::units::cache::level::CacheLevel;
use crate::soc::memory::MainMemory;

/// Index of a level inside a [`MemoryHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(usize);

impl LevelId {
    /// Position of the level in insertion order.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A level of the hierarchy.
#[derive(Debug)]
pub enum Device {
    /// A cache with a write policy and a lower level.
    Cache(CacheLevel),
    /// The terminal memory device.
    Memory(MainMemory),
}

impl Device {
    /// Section name of the device.
    pub fn name(&self) -> &str {
        match self {
            Self::Cache(c) => c.name(),
            Self::Memory(m) => m.name(),
        }
    }
}

#[derive(Debug)]
struct Node {
    name: String,
    /// `None` only while the device is serving a request.
    device: Option<Device>,
    lower: Option<LevelId>,
}

/// Arena of memory levels linked by [`LevelId`].
///
/// A cache can only be added once its lower level exists, so every chain is
/// acyclic and ends at a memory device by construction.
#[derive(Debug, Default)]
pub struct MemoryHierarchy {
    nodes: Vec<Node>,
    by_name: HashMap<String, LevelId>,
}

impl MemoryHierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a terminal memory device.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if the name is already taken.
    pub fn add_memory(&mut self, memory: MainMemory) -> SimResult<LevelId> {
        let name = memory.name().to_string();
        self.insert(name, Device::Memory(memory), None)
    }

    /// Adds a cache above an existing level.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if the name is taken or `lower` is
    /// not a level of this hierarchy.
    pub fn add_cache(&mut self, cache: CacheLevel, lower: LevelId) -> SimResult<LevelId> {
        if lower.0 >= self.nodes.len() {
            return Err(SimError::config(format!(
                "cache `{}` names lower level {lower} which does not exist",
                cache.name()
            )));
        }
        let name = cache.name().to_string();
        self.insert(name, Device::Cache(cache), Some(lower))
    }

    fn insert(&mut self, name: String, device: Device, lower: Option<LevelId>) -> SimResult<LevelId> {
        if self.by_name.contains_key(&name) {
            return Err(SimError::config(format!("memory level `{name}` defined twice")));
        }
        let id = LevelId(self.nodes.len());
        let _ = self.by_name.insert(name.clone(), id);
        self.nodes.push(Node {
            name,
            device: Some(device),
            lower,
        });
        Ok(id)
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no level has been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a level by section name.
    pub fn id(&self, name: &str) -> Option<LevelId> {
        self.by_name.get(name).copied()
    }

    /// Section name of a level.
    pub fn name(&self, id: LevelId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.name.as_str())
    }

    /// The level a cache forwards to; `None` for memory.
    pub fn lower(&self, id: LevelId) -> Option<LevelId> {
        self.nodes.get(id.0).and_then(|n| n.lower)
    }

    /// Returns the device at `id`.
    pub fn device(&self, id: LevelId) -> Option<&Device> {
        self.nodes.get(id.0).and_then(|n| n.device.as_ref())
    }

    /// Returns the cache at `id`, if it is one.
    pub fn cache(&self, id: LevelId) -> Option<&CacheLevel> {
        match self.device(id) {
            Some(Device::Cache(c)) => Some(c),
            _ => None,
        }
    }

    /// Returns the memory device at `id`, if it is one.
    pub fn memory(&self, id: LevelId) -> Option<&MainMemory> {
        match self.device(id) {
            Some(Device::Memory(m)) => Some(m),
            _ => None,
        }
    }

    /// Iterates over all levels in insertion order (lowest levels first).
    pub fn iter(&self) -> impl Iterator<Item = (LevelId, &Device)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.device.as_ref().map(|d| (LevelId(i), d)))
    }

    /// Serves `req` at level `id`.
    ///
    /// Misses and writebacks travel further down before this returns; the
    /// request's latency accumulates every level it touches.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvariantViolation`] for an unknown id or a level
    /// that is reached again while it is still serving a request, and any
    /// error raised by the levels themselves.
    pub fn access(&mut self, id: LevelId, req: &mut MemRequest) -> SimResult<()> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| SimError::invariant(format!("no memory level {id}")))?;
        let lower = node.lower;
        let mut device = node.device.take().ok_or_else(|| {
            SimError::invariant(format!("memory level `{}` re-entered during an access", node.name))
        })?;

        let result = match &mut device {
            Device::Memory(memory) => {
                memory.access(req);
                Ok(())
            }
            Device::Cache(cache) => {
                let mut forward = |r: &mut MemRequest| match lower {
                    Some(next) => self.access(next, r),
                    None => Err(SimError::invariant("cache has no lower level")),
                };
                cache.access(req, &mut forward)
            }
        };

        if let Some(node) = self.nodes.get_mut(id.0) {
            node.device = Some(device);
        }
        result
    }
}
