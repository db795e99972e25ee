//! Random Replacement Policy.
//!
//! This policy evicts a random line from the set. It uses a xorshift
//! generator with a fixed seed, so two runs with the same trace and
//! configuration evict the same lines.

use super::ReplacementPolicy;
use crate::core::units::cache::CacheLine;

/// Seed used when no explicit seed is given.
const DEFAULT_SEED: u64 = 123_456_789;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a policy with an explicit non-zero seed.
    ///
    /// A zero seed would lock xorshift at zero, so it is replaced by the default.
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn victim(&mut self, set: &[CacheLine]) -> usize {
        (self.next() % set.len() as u64) as usize
    }
}
