//! Test utilities
//!
//! Manual in-memory implementations of the arena ports and fixtures for
//! unit testing.
//!
//! `InMemoryArenaStore` hands out snapshot transactions: each one works on
//! its own copy of the state, and `commit` writes that copy back. Faults can
//! be queued per operation name to exercise rollback and retry paths.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
