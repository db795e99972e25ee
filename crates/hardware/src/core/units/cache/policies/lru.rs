//! Least Recently Used (LRU) Replacement Policy.
//!
//! Recency is tracked on the lines themselves: every probe of a set ages each
//! valid line by one and a hit resets the hit line to zero. The victim is the
//! line with the strictly greatest age; on a tie the lowest way wins.

use super::ReplacementPolicy;
use crate::core::units::cache::CacheLine;

/// LRU Policy. Stateless; the ages live in [`CacheLine`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl ReplacementPolicy for LruPolicy {
    fn victim(&mut self, set: &[CacheLine]) -> usize {
        let mut oldest = 0;
        for (way, line) in set.iter().enumerate().skip(1) {
            if line.age() > set[oldest].age() {
                oldest = way;
            }
        }
        oldest
    }
}
