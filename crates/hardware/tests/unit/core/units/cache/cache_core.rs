//! Cache Core Unit Tests.
//!
//! Verifies address decomposition, set probing with LRU ageing, and line
//! allocation with dirty-victim reporting. The core is constructed directly
//! from a `CacheConfig`; no hierarchy is involved.

use pretty_assertions::assert_eq;
use rstest::rstest;

use pipesim_core::common::SimError;
use pipesim_core::config::{CacheConfig, WritePolicy};
use pipesim_core::core::units::cache::CacheCore;

use crate::common::harness::cache;

// ──────────────────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────────────────

/// 64 bytes, 16-byte lines, direct-mapped: 4 sets.
///
/// set = (addr / 16) % 4, tag = addr / 64
fn direct_mapped() -> CacheConfig {
    cache(WritePolicy::WriteBack, 64, 1, 16, "Memory")
}

/// 64 bytes, 16-byte lines, 4-way: a single fully associative set.
fn fully_associative() -> CacheConfig {
    cache(WritePolicy::WriteBack, 64, 4, 16, "Memory")
}

/// Probes and fills on a miss, as a read miss would.
fn touch(core: &mut CacheCore, addr: u64) -> Option<u64> {
    match core.access_line(addr).unwrap() {
        Some(_) => None,
        None => core.allocate_line(addr).unwrap().dirty_victim,
    }
}

/// Probes and fills on a miss, then marks the line dirty, as a write-back write would.
fn touch_dirty(core: &mut CacheCore, addr: u64) -> Option<u64> {
    let (index, victim) = match core.access_line(addr).unwrap() {
        Some(index) => (index, None),
        None => {
            let alloc = core.allocate_line(addr).unwrap();
            (alloc.index, alloc.dirty_victim)
        }
    };
    core.line_mut(index).unwrap().mark_dirty();
    victim
}

// ══════════════════════════════════════════════════════════
// 1. Address mapping
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x00, 0, 0)]
#[case(0x0f, 0, 0)]
#[case(0x10, 1, 0)]
#[case(0x30, 3, 0)]
#[case(0x40, 0, 1)]
#[case(0x1234, 3, 0x48)]
fn set_and_tag(#[case] addr: u64, #[case] set: usize, #[case] tag: u64) {
    let core = CacheCore::new(&direct_mapped()).unwrap();
    assert_eq!(core.set_index(addr), set, "set of {addr:#x}");
    assert_eq!(core.tag(addr), tag, "tag of {addr:#x}");
}

#[test]
fn block_address_reconstructs_line_base() {
    let core = CacheCore::new(&direct_mapped()).unwrap();
    let addr = 0x1234;
    let base = core.block_addr(core.tag(addr), core.set_index(addr));
    assert_eq!(base, 0x1230);
}

#[test]
fn geometry_is_derived_from_config() {
    let core = CacheCore::new(&cache(WritePolicy::WriteBack, 1024, 2, 32, "L2")).unwrap();
    assert_eq!(core.num_sets(), 16);
    assert_eq!(core.assoc(), 2);
    assert_eq!(core.bsize(), 32);
}

#[rstest]
#[case(direct_mapped(), 0x20, 2..3)]
#[case(fully_associative(), 0x20, 0..4)]
#[case(cache(WritePolicy::WriteBack, 128, 2, 16, "M"), 0x30, 6..8)]
fn line_range_covers_one_set(
    #[case] config: CacheConfig,
    #[case] addr: u64,
    #[case] expected: std::ops::Range<usize>,
) {
    let core = CacheCore::new(&config).unwrap();
    assert_eq!(core.line_range(addr).unwrap(), expected);
}

#[rstest]
#[case::zero_assoc(cache(WritePolicy::WriteBack, 64, 0, 16, "M"))]
#[case::zero_bsize(cache(WritePolicy::WriteBack, 64, 1, 0, "M"))]
#[case::smaller_than_a_set(cache(WritePolicy::WriteBack, 16, 2, 16, "M"))]
#[case::partial_line(cache(WritePolicy::WriteBack, 72, 1, 16, "M"))]
fn bad_geometry_is_rejected(#[case] config: CacheConfig) {
    let err = CacheCore::new(&config).unwrap_err();
    assert!(matches!(err, SimError::ConfigInvalid(_)), "got {err:?}");
}

// ══════════════════════════════════════════════════════════
// 2. Probing and ageing
// ══════════════════════════════════════════════════════════

#[test]
fn cold_probe_misses_then_hits_after_allocation() {
    let mut core = CacheCore::new(&direct_mapped()).unwrap();
    assert_eq!(core.access_line(0x100).unwrap(), None, "cold miss");

    let alloc = core.allocate_line(0x100).unwrap();
    assert_eq!(alloc.dirty_victim, None, "nothing to evict");
    assert_eq!(core.access_line(0x104).unwrap(), Some(alloc.index), "same block hits");
}

#[test]
fn probe_ages_valid_neighbours_and_resets_hit_line() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    let _ = touch(&mut core, 0x00);
    let _ = touch(&mut core, 0x10);
    let _ = touch(&mut core, 0x20);

    // Hit on 0x10: the other two age, 0x10 resets.
    assert!(core.access_line(0x10).unwrap().is_some());

    let ages: Vec<(u64, u32)> = core.contents().iter().map(|l| (l.addr, l.age)).collect();
    assert_eq!(ages, vec![(0x00, 3), (0x10, 0), (0x20, 1)]);
}

#[test]
fn probe_does_not_age_invalid_lines() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    let _ = touch(&mut core, 0x00);
    for _ in 0..5 {
        let _ = core.access_line(0x00).unwrap();
    }
    let lines = core.contents();
    assert_eq!(lines.len(), 1, "only one line was ever allocated");
    assert_eq!(lines[0].age, 0);
}

#[test]
fn contains_does_not_disturb_ages() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    let _ = touch(&mut core, 0x00);
    let _ = touch(&mut core, 0x10);
    let before = core.contents();
    assert!(core.contains(0x00));
    assert!(!core.contains(0x40));
    assert_eq!(core.contents(), before);
}

// ══════════════════════════════════════════════════════════
// 3. Allocation and eviction
// ══════════════════════════════════════════════════════════

#[test]
fn allocation_prefers_lowest_invalid_way() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    let a = core.allocate_line(0x00).unwrap();
    let b = core.allocate_line(0x10).unwrap();
    assert_eq!((a.index, b.index), (0, 1));

    let line = core.line(b.index).unwrap();
    assert!(line.is_valid() && !line.is_dirty());
    assert_eq!(line.age(), 0);
}

#[test]
fn direct_mapped_conflict_evicts_clean_line_silently() {
    let mut core = CacheCore::new(&direct_mapped()).unwrap();
    assert_eq!(touch(&mut core, 0x00), None);
    assert_eq!(touch(&mut core, 0x40), None, "clean victim needs no writeback");
    assert!(!core.contains(0x00), "first block was replaced");
    assert_eq!(core.access_line(0x00).unwrap(), None, "re-access misses");
}

#[test]
fn direct_mapped_conflict_reports_dirty_victim_address() {
    let mut core = CacheCore::new(&direct_mapped()).unwrap();
    let _ = touch_dirty(&mut core, 0x08);
    assert_eq!(touch(&mut core, 0x48), Some(0x00), "victim base address");

    let line = core.contents()[0];
    assert_eq!(line.addr, 0x40);
    assert!(!line.dirty, "new occupant starts clean");
}

#[test]
fn five_conflicting_misses_evict_in_arrival_order_direct_mapped() {
    let mut core = CacheCore::new(&direct_mapped()).unwrap();
    let addrs = [0x000, 0x040, 0x080, 0x0c0, 0x100];
    let victims: Vec<Option<u64>> = addrs.iter().map(|&a| touch_dirty(&mut core, a)).collect();

    assert_eq!(
        victims,
        vec![None, Some(0x000), Some(0x040), Some(0x080), Some(0x0c0)]
    );
    assert_eq!(core.contents().len(), 1);
}

#[test]
fn five_misses_in_full_set_evict_least_recently_used() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    let addrs = [0x000, 0x100, 0x200, 0x300, 0x400, 0x500];
    let victims: Vec<Option<u64>> = addrs.iter().map(|&a| touch_dirty(&mut core, a)).collect();

    assert_eq!(
        victims,
        vec![None, None, None, None, Some(0x000), Some(0x100)],
        "oldest occupant goes first"
    );
}

#[test]
fn hit_protects_line_from_eviction() {
    let mut core = CacheCore::new(&fully_associative()).unwrap();
    for addr in [0x000, 0x100, 0x200, 0x300] {
        let _ = touch_dirty(&mut core, addr);
    }
    // Re-use the oldest block; 0x100 becomes the LRU line.
    let _ = touch(&mut core, 0x000);
    assert_eq!(touch(&mut core, 0x400), Some(0x100));
}
