//! Cache Replacement Policies.
//!
//! Implements victim selection for a full set-associative set.
//!
//! # Policies
//!
//! - `Lru`: Evict the line with the greatest age (probes since its last hit).
//! - `Random`: Evict a pseudo-random way.
//!
//! Both policies only run once every way in the set is valid; invalid ways
//! are always filled first by the cache core.

/// Age-based least-recently-used replacement policy.
pub mod lru;

/// Pseudo-random replacement policy.
pub mod random;

pub use lru::LruPolicy;
pub use random::RandomPolicy;

use super::CacheLine;
use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
pub trait ReplacementPolicy: Send + Sync + std::fmt::Debug {
    /// Selects the way to evict from a full set.
    ///
    /// # Arguments
    ///
    /// * `set` - The lines of one set, in way order. Never empty.
    ///
    /// # Returns
    ///
    /// Index of the victim way within `set`.
    fn victim(&mut self, set: &[CacheLine]) -> usize;
}

/// Instantiates the policy named in the configuration.
pub fn build(kind: PolicyType) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Lru => Box::new(LruPolicy),
        PolicyType::Random => Box::new(RandomPolicy::default()),
    }
}
