//! Stable exit codes for termdojo CLI commands.

/// Command succeeded, or `play` completed the mission.
pub const OK: i32 = 0;
/// Invalid workspace, config, mission pack or arguments, or any other error.
pub const INVALID: i32 = 1;
/// `termdojo play` reached the end of input before the mission was completed.
pub const INCOMPLETE: i32 = 2;
