//! Terminal-skills trainer built around a sandboxed command engine.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: In-memory filesystem, goal DSL and session emulator.
//!   No I/O, fully testable in isolation.
//! - **[`commands`]** and **[`runner`]**: Command dispatch and the mission
//!   runner built on top of the core.
//! - **[`io`]**: Config, workspace scaffolding and mission packs on disk.
//!
//! [`play`] and [`card`] drive the `termdojo` CLI.

pub mod card;
pub mod commands;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod mission;
pub mod play;
pub mod runner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
