//! Deterministic sandbox engine.
//!
//! Core modules are free of I/O side effects. They operate on in-memory data
//! structures and return deterministic outputs suitable for tests; the only
//! nondeterminism is the wall-clock timestamp recorded on file nodes.

pub mod error;
pub mod filesystem;
pub mod goal;
pub mod invariants;
pub mod path;
pub mod session;
pub mod types;
pub mod wildcard;
