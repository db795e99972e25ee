//! Cache Level Unit Tests.
//!
//! Verifies write-back and write-through behaviour in isolation. Each level
//! forwards to a `RecordingLower` that logs every request it receives, so the
//! tests can assert exactly what reached the next level down.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use pipesim_core::common::{MemOp, MemRequest, SimError, SimResult};
use pipesim_core::config::WritePolicy;
use pipesim_core::core::units::cache::level::CacheLevel;

use crate::common::harness::{RecordingLower, cache};

// ──────────────────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────────────────

/// Direct-mapped, 4 sets of 16 bytes. 0x00, 0x40, 0x80 all map to set 0.
fn level(policy: WritePolicy) -> CacheLevel {
    CacheLevel::new("DL1", &cache(policy, 64, 1, 16, "Memory")).unwrap()
}

/// Sends one request and returns its accumulated latency.
fn access(level: &mut CacheLevel, lower: &mut RecordingLower, op: MemOp, addr: u64) -> SimResult<u64> {
    let mut req = MemRequest::new(addr, op);
    level.access(&mut req, &mut |r: &mut MemRequest| lower.forward(r))?;
    Ok(req.latency())
}

fn dirty_lines(level: &CacheLevel) -> usize {
    level.core().contents().iter().filter(|l| l.dirty).count()
}

#[test]
fn construction_checks_the_named_section() {
    let err = CacheLevel::new("DL1", &cache(WritePolicy::WriteBack, 64, 1, 16, "DL1")).unwrap_err();
    assert!(err.to_string().contains("DL1.lowerLevel"), "{err}");

    let err = CacheLevel::new("DL1", &cache(WritePolicy::WriteBack, 0, 1, 16, "Memory")).unwrap_err();
    assert!(matches!(err, SimError::ConfigInvalid(_)), "got {err:?}");
    assert!(err.to_string().contains("DL1.size"), "{err}");
}

// ══════════════════════════════════════════════════════════
// 1. Write-back: reads
// ══════════════════════════════════════════════════════════

#[test]
fn wb_read_miss_forwards_then_allocates() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::with_delay(10);

    let latency = access(&mut l1, &mut lower, MemOp::Read, 0x10).unwrap();
    assert_eq!(latency, 11, "hit delay plus lower delay");
    assert_eq!(lower.requests, vec![(MemOp::Read, 0x10)]);
    assert!(l1.core().contains(0x10), "block allocated after miss");

    let latency = access(&mut l1, &mut lower, MemOp::Read, 0x14).unwrap();
    assert_eq!(latency, 1, "hit pays only the hit delay");
    assert_eq!(lower.requests.len(), 1, "hit does not forward");

    let s = l1.stats();
    assert_eq!((s.read_hits, s.read_misses), (1, 1));
}

// ══════════════════════════════════════════════════════════
// 2. Write-back: writes
// ══════════════════════════════════════════════════════════

#[test]
fn wb_write_hit_marks_dirty_without_forwarding() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x20).unwrap();
    lower.requests.clear();

    let _ = access(&mut l1, &mut lower, MemOp::Write, 0x24).unwrap();
    assert!(lower.requests.is_empty(), "write hit stays local");
    assert_eq!(dirty_lines(&l1), 1);
    assert_eq!(l1.stats().write_hits, 1);
}

#[test]
fn wb_write_miss_fetches_block_as_read_and_dirties_it() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();

    let _ = access(&mut l1, &mut lower, MemOp::Write, 0x30).unwrap();
    assert_eq!(lower.requests, vec![(MemOp::Read, 0x30)], "exactly one read, no write");
    assert!(l1.core().contains(0x30));
    assert_eq!(dirty_lines(&l1), 1);
    assert_eq!(l1.stats().write_misses, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Write-back: evictions
// ══════════════════════════════════════════════════════════

#[test]
fn wb_dirty_eviction_emits_one_writeback_with_victim_address() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l1, &mut lower, MemOp::Write, 0x08).unwrap();
    lower.requests.clear();

    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x40).unwrap();
    assert_eq!(
        lower.requests,
        vec![(MemOp::Read, 0x40), (MemOp::WriteBack, 0x00)],
        "demand read, then the victim's writeback"
    );
    assert_eq!(l1.stats().writebacks, 1);
    assert_eq!(dirty_lines(&l1), 0, "new occupant is clean");
}

#[test]
fn wb_clean_eviction_emits_nothing_extra() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x00).unwrap();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x40).unwrap();

    assert_eq!(lower.count(MemOp::WriteBack), 0);
    assert_eq!(l1.stats().writebacks, 0);
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x00).unwrap();
    assert_eq!(l1.stats().read_misses, 3, "first block was evicted");
}

// ══════════════════════════════════════════════════════════
// 4. Write-back: absorbing writebacks from above
// ══════════════════════════════════════════════════════════

#[test]
fn wb_absorbs_writeback_for_resident_block() {
    let mut l2 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l2, &mut lower, MemOp::Read, 0x50).unwrap();
    lower.requests.clear();

    let _ = access(&mut l2, &mut lower, MemOp::WriteBack, 0x50).unwrap();
    assert!(lower.requests.is_empty());
    assert_eq!(dirty_lines(&l2), 1);
}

#[test]
fn wb_forwards_writeback_for_absent_block_without_allocating() {
    let mut l2 = level(WritePolicy::WriteBack);
    let mut lower = RecordingLower::default();

    let _ = access(&mut l2, &mut lower, MemOp::WriteBack, 0x60).unwrap();
    assert_eq!(lower.requests, vec![(MemOp::WriteBack, 0x60)]);
    assert!(!l2.core().contains(0x60));
    assert_eq!(l2.stats().accesses(), 0, "writebacks are not demand accesses");
}

// ══════════════════════════════════════════════════════════
// 5. Write-through
// ══════════════════════════════════════════════════════════

#[test]
fn wt_write_always_reaches_lower_level_once() {
    let mut l1 = level(WritePolicy::WriteThrough);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x10).unwrap();
    lower.requests.clear();

    let _ = access(&mut l1, &mut lower, MemOp::Write, 0x10).unwrap(); // hit
    let _ = access(&mut l1, &mut lower, MemOp::Write, 0x90).unwrap(); // miss
    assert_eq!(lower.requests, vec![(MemOp::Write, 0x10), (MemOp::Write, 0x90)]);

    let s = l1.stats();
    assert_eq!((s.write_hits, s.write_misses), (1, 1));
    assert!(!l1.core().contains(0x90), "write miss does not allocate");
    assert_eq!(dirty_lines(&l1), 0);
}

#[test]
fn wt_read_miss_allocates_clean_line() {
    let mut l1 = level(WritePolicy::WriteThrough);
    let mut lower = RecordingLower::default();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x00).unwrap();
    let _ = access(&mut l1, &mut lower, MemOp::Read, 0x40).unwrap();

    assert_eq!(lower.count(MemOp::WriteBack), 0);
    assert_eq!(dirty_lines(&l1), 0);
}

#[test]
fn wt_rejects_writeback() {
    let mut l1 = level(WritePolicy::WriteThrough);
    let mut lower = RecordingLower::default();

    let err = access(&mut l1, &mut lower, MemOp::WriteBack, 0x70).unwrap_err();
    match &err {
        SimError::IllegalWriteBack { level, addr } => {
            assert_eq!(level, "DL1");
            assert_eq!(*addr, 0x70);
        }
        other => panic!("expected IllegalWriteBack, got {other:?}"),
    }
    assert!(err.is_config());
    assert!(lower.requests.is_empty());
}

#[test]
fn lower_level_errors_propagate() {
    let mut l1 = level(WritePolicy::WriteBack);
    let mut req = MemRequest::new(0x10, MemOp::Read);
    let err = l1
        .access(&mut req, &mut |_: &mut MemRequest| Err(SimError::invariant("boom")))
        .unwrap_err();
    assert!(matches!(err, SimError::InvariantViolation(_)));
}

proptest! {
    #[test]
    fn wt_forwards_every_write_and_never_dirties(
        ops in prop::collection::vec((any::<bool>(), 0u64..0x400), 1..64)
    ) {
        let mut l1 = level(WritePolicy::WriteThrough);
        let mut lower = RecordingLower::default();
        let mut writes = 0;
        for (is_write, addr) in &ops {
            let op = if *is_write { MemOp::Write } else { MemOp::Read };
            writes += usize::from(*is_write);
            let _ = access(&mut l1, &mut lower, op, *addr).unwrap();
        }
        prop_assert_eq!(lower.count(MemOp::Write), writes);
        prop_assert_eq!(lower.count(MemOp::WriteBack), 0);
        prop_assert_eq!(dirty_lines(&l1), 0);
    }

    #[test]
    fn wb_write_hits_never_forward(addr in 0u64..0x1000, repeats in 1usize..8) {
        let mut l1 = level(WritePolicy::WriteBack);
        let mut lower = RecordingLower::default();
        let _ = access(&mut l1, &mut lower, MemOp::Write, addr).unwrap();
        let after_miss = lower.requests.len();
        for _ in 0..repeats {
            let _ = access(&mut l1, &mut lower, MemOp::Write, addr).unwrap();
        }
        prop_assert_eq!(lower.requests.len(), after_miss);
        prop_assert_eq!(l1.stats().write_hits, repeats as u64);
    }
}
