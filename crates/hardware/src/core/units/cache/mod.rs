//! Set-Associative Cache Storage.
//!
//! This module implements the tag store shared by every cache level. It owns
//! the lines, maps addresses to sets and tags, tracks LRU ages, and picks
//! victims. It knows nothing about write policies; those live in [`level`].
//!
//! # Address mapping
//!
//! With `num_sets = size / bsize / assoc`:
//!
//! - `set = (addr / bsize) % num_sets`
//! - `tag = addr / (bsize * num_sets)`
//! - a line in set `s` with tag `t` covers `(t * num_sets + s) * bsize`.

/// Cache level with write-back or write-through behaviour.
pub mod level;

/// Cache replacement policy implementations (LRU, Random).
pub mod policies;

use std::fmt;
use std::ops::Range;

use self::policies::ReplacementPolicy;
use crate::common::{SimError, SimResult};
use crate::config::CacheConfig;

/// Cache line entry containing tag, validity, dirty bit, and LRU age.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
    age: u32,
}

impl CacheLine {
    /// Tag stored in this line. Meaningless while the line is invalid.
    pub const fn tag(&self) -> u64 {
        self.tag
    }

    /// Returns true if the line holds data.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns true if the line was modified since it was filled.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of set probes since the line was last hit or filled.
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Marks the line as modified.
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// A valid line as reported by [`CacheCore::contents`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResidentLine {
    /// Set index.
    pub set: usize,
    /// Way within the set.
    pub way: usize,
    /// Stored tag.
    pub tag: u64,
    /// Base address of the cached block.
    pub addr: u64,
    /// Whether the block has been written since it was filled.
    pub dirty: bool,
    /// LRU age at the time of the query.
    pub age: u32,
}

/// Result of allocating a line for a missed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Flat index of the freshly filled line (see [`CacheCore::line`]).
    pub index: usize,
    /// Base address of the evicted block, if the victim was valid and dirty.
    pub dirty_victim: Option<u64>,
}

/// Tag store of a set-associative cache.
pub struct CacheCore {
    lines: Vec<CacheLine>,
    num_sets: usize,
    assoc: usize,
    bsize: usize,
    policy: Box<dyn ReplacementPolicy>,
}

impl CacheCore {
    /// Creates an empty tag store.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache geometry and replacement policy.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigInvalid`] if the geometry does not split into
    /// whole lines and sets.
    pub fn new(config: &CacheConfig) -> SimResult<Self> {
        config.validate_geometry("cache")?;
        let num_sets = config.num_lines() / config.assoc;
        Ok(Self {
            lines: vec![CacheLine::default(); num_sets * config.assoc],
            num_sets,
            assoc: config.assoc,
            bsize: config.bsize,
            policy: policies::build(config.repl_policy),
        })
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Ways per set.
    pub const fn assoc(&self) -> usize {
        self.assoc
    }

    /// Block size in bytes.
    pub const fn bsize(&self) -> usize {
        self.bsize
    }

    /// Set index that `addr` maps to.
    pub const fn set_index(&self, addr: u64) -> usize {
        ((addr / self.bsize as u64) % self.num_sets as u64) as usize
    }

    /// Tag of `addr`.
    pub const fn tag(&self, addr: u64) -> u64 {
        addr / (self.bsize as u64 * self.num_sets as u64)
    }

    /// Base address of the block with the given tag in the given set.
    pub const fn block_addr(&self, tag: u64, set: usize) -> u64 {
        (tag * self.num_sets as u64 + set as u64) * self.bsize as u64
    }

    /// Returns the flat line-index range of the set that `addr` maps to.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvariantViolation`] if the computed range does not
    /// fit inside the line array. That can only happen with a corrupted
    /// geometry and is never a recoverable condition.
    pub fn line_range(&self, addr: u64) -> SimResult<Range<usize>> {
        let start = self.set_index(addr) * self.assoc;
        let end = start + self.assoc;
        if end > self.lines.len() {
            return Err(SimError::invariant(format!(
                "set range {start}..{end} exceeds {} lines for address {addr:#x}",
                self.lines.len()
            )));
        }
        Ok(start..end)
    }

    /// Probes the set for `addr`.
    ///
    /// Every valid line in the set ages by one; a hit resets the hit line's
    /// age to zero.
    ///
    /// # Returns
    ///
    /// The flat index of the matching valid line, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheCore::line_range`] failures.
    pub fn access_line(&mut self, addr: u64) -> SimResult<Option<usize>> {
        let range = self.line_range(addr)?;
        let tag = self.tag(addr);
        let base = range.start;
        let mut hit = None;
        for (way, line) in self.lines[range].iter_mut().enumerate() {
            if !line.valid {
                continue;
            }
            line.age = line.age.saturating_add(1);
            if line.tag == tag {
                line.age = 0;
                hit = Some(base + way);
            }
        }
        Ok(hit)
    }

    /// Fills a line for `addr`, evicting if necessary.
    ///
    /// An invalid way is always taken first (lowest way wins). Otherwise the
    /// replacement policy chooses the victim. The new line is valid, clean,
    /// tagged for `addr`, and has age zero.
    ///
    /// # Returns
    ///
    /// The filled line's index and, if the victim was dirty, the base address
    /// of the block that must be written back.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvariantViolation`] if the set range is invalid or
    /// the replacement policy names a way outside the set.
    pub fn allocate_line(&mut self, addr: u64) -> SimResult<Allocation> {
        let range = self.line_range(addr)?;
        let set = self.set_index(addr);
        let base = range.start;
        let ways = &self.lines[range];

        let way = match ways.iter().position(|l| !l.valid) {
            Some(free) => free,
            None => self.policy.victim(ways),
        };
        if way >= self.assoc {
            return Err(SimError::invariant(format!(
                "replacement policy chose way {way} in a {}-way set",
                self.assoc
            )));
        }

        let index = base + way;
        let victim = self.lines[index];
        let dirty_victim = (victim.valid && victim.dirty).then(|| self.block_addr(victim.tag, set));

        self.lines[index] = CacheLine {
            tag: self.tag(addr),
            valid: true,
            dirty: false,
            age: 0,
        };
        Ok(Allocation { index, dirty_victim })
    }

    /// Returns the line at a flat index.
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// Returns the line at a flat index mutably.
    pub fn line_mut(&mut self, index: usize) -> Option<&mut CacheLine> {
        self.lines.get_mut(index)
    }

    /// Returns true if the block containing `addr` is resident. Does not age lines.
    pub fn contains(&self, addr: u64) -> bool {
        let tag = self.tag(addr);
        self.line_range(addr)
            .is_ok_and(|r| self.lines[r].iter().any(|l| l.valid && l.tag == tag))
    }

    /// Lists every valid line in set and way order.
    pub fn contents(&self) -> Vec<ResidentLine> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.valid)
            .map(|(i, l)| {
                let set = i / self.assoc;
                ResidentLine {
                    set,
                    way: i % self.assoc,
                    tag: l.tag,
                    addr: self.block_addr(l.tag, set),
                    dirty: l.dirty,
                    age: l.age,
                }
            })
            .collect()
    }
}

impl fmt::Debug for CacheCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("num_sets", &self.num_sets)
            .field("assoc", &self.assoc)
            .field("bsize", &self.bsize)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
