//! Functional components shared by the core.
//!
//! The only unit modelled in detail is the cache: its tag store, replacement
//! policies, and the write-policy level wrapper.

/// Set-associative cache storage, replacement policies, and cache levels.
pub mod cache;
