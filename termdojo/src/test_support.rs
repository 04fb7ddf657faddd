//! Test-only helpers for constructing missions, packs and dojo workspaces.

use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::core::goal::GoalNode;
use crate::io::init::{DojoPaths, InitOptions, init_dojo};
use crate::mission::{Mission, MissionDef, MissionPack, PACK_VERSION};

/// Create a deterministic mission with no setup.
pub fn mission(id: &str, goal: GoalNode) -> Mission {
    Mission {
        id: id.to_string(),
        skill_id: "test".to_string(),
        level: 0,
        title: format!("{id} title"),
        briefing: format!("{id} briefing"),
        hint: format!("{id} hint"),
        explanation: format!("{id} explanation"),
        commands: Vec::new(),
        setup: Vec::new(),
        goal,
    }
}

/// Create a mission definition with a raw JSON goal.
pub fn mission_def(id: &str, goal: serde_json::Value) -> MissionDef {
    MissionDef {
        id: id.to_string(),
        skill_id: "test".to_string(),
        level: 0,
        title: format!("{id} title"),
        briefing: format!("{id} briefing"),
        hint: format!("{id} hint"),
        explanation: format!("{id} explanation"),
        commands: Vec::new(),
        setup: Vec::new(),
        goal,
    }
}

pub fn pack(missions: Vec<MissionDef>) -> MissionPack {
    MissionPack {
        version: PACK_VERSION,
        missions,
    }
}

/// Initialize `.termdojo/` in `root` with the built-in pack.
pub fn init_workspace(root: &Path) -> Result<DojoPaths> {
    init_dojo(root, &InitOptions { force: false })
}

/// Fresh temporary directory with an initialized `.termdojo/`.
///
/// Keep the returned `TempDir` alive for as long as the paths are used.
pub fn temp_workspace() -> Result<(TempDir, DojoPaths)> {
    let temp = tempfile::tempdir()?;
    let paths = init_workspace(temp.path())?;
    Ok((temp, paths))
}
