//! Shared value types passed between the engine and its callers.

use chrono::{DateTime, Utc};

/// Kind of a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Regular,
    Directory,
}

/// Point-in-time description of one node, as reported by `stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub kind: NodeKind,
    /// Byte length of the content; `None` for directories.
    pub size: Option<usize>,
    pub modified: DateTime<Utc>,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Outcome of executing one line of input.
///
/// `completed` reflects the mission as a whole and stays `true` once the
/// goal has been met.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub success: bool,
    pub error: String,
    pub completed: bool,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}
