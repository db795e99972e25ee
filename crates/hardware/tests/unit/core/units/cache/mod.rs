/// Address mapping, probing, and allocation.
pub mod cache_core;

/// Write-back and write-through level behaviour.
pub mod level;
