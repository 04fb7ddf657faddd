//! I/O helpers for termdojo commands.

pub mod config;
pub mod init;
pub mod mission_store;
