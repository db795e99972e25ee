//! Statistics Unit Tests.

use pretty_assertions::assert_eq;

use pipesim_core::stats::{CacheStats, MemoryStats, SimStats};

#[test]
fn cpi_and_ipc_are_reciprocal() {
    let stats = SimStats {
        cycles: 120,
        instructions_retired: 80,
        ..SimStats::default()
    };
    assert!((stats.cpi() - 1.5).abs() < f64::EPSILON);
    assert!((stats.ipc() * stats.cpi() - 1.0).abs() < 1e-12);
}

#[test]
fn empty_run_has_zero_ratios() {
    let stats = SimStats::default();
    assert!(stats.cpi().abs() < f64::EPSILON);
    assert!(stats.ipc().abs() < f64::EPSILON);
    assert!(CacheStats::default().hit_rate().abs() < f64::EPSILON);
}

#[test]
fn cache_counters_combine() {
    let stats = CacheStats {
        read_hits: 6,
        read_misses: 2,
        write_hits: 1,
        write_misses: 1,
        writebacks: 3,
    };
    assert_eq!(stats.accesses(), 10);
    assert_eq!(stats.misses(), 3);
    assert!((stats.hit_rate() - 0.7).abs() < 1e-12);
}

#[test]
fn latency_totals() {
    let stats = SimStats {
        inst_latency: 40,
        data_latency: 2,
        ..SimStats::default()
    };
    assert_eq!(stats.total_latency(), 42);
    let memory = MemoryStats {
        reads: 4,
        writes: 2,
        writebacks: 1,
    };
    assert_eq!(memory.total(), 7);
}
