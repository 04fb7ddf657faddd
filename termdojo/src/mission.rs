//! Mission records, mission packs and catalog queries.
//!
//! A pack is the serialized form (`missions.json`); a [`Catalog`] holds the
//! same missions with their goals parsed into [`GoalNode`] trees.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::goal::GoalNode;

/// Pack format version understood by this build.
pub const PACK_VERSION: u32 = 1;
/// Highest mission level.
pub const MAX_LEVEL: u8 = 5;

/// Pack shipped with the binary and written by `termdojo init`.
pub const BUILTIN_PACK: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/missions/default.json"));

/// One step of a mission's initial environment, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupAction {
    Mkdir(String),
    Cd(String),
    Touch(String),
    WriteFile { path: String, content: String },
}

/// Mission as stored in a pack, goal still untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDef {
    pub id: String,
    pub skill_id: String,
    pub level: u8,
    #[serde(default)]
    pub title: String,
    pub briefing: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub setup: Vec<SetupAction>,
    #[serde(default)]
    pub goal: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPack {
    pub version: u32,
    pub missions: Vec<MissionDef>,
}

/// A playable mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub id: String,
    pub skill_id: String,
    pub level: u8,
    pub title: String,
    pub briefing: String,
    pub hint: String,
    pub explanation: String,
    pub commands: Vec<String>,
    pub setup: Vec<SetupAction>,
    pub goal: GoalNode,
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("parse mission pack: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mission pack invariants failed:\n- {}", .0.join("\n- "))]
    Invariants(Vec<String>),
}

impl Mission {
    fn with_goal(def: MissionDef, goal: GoalNode) -> Self {
        Self {
            id: def.id,
            skill_id: def.skill_id,
            level: def.level,
            title: def.title,
            briefing: def.briefing,
            hint: def.hint,
            explanation: def.explanation,
            commands: def.commands,
            setup: def.setup,
            goal,
        }
    }
}

/// Semantic checks beyond the JSON schema. Returns every violation found.
pub fn validate_pack(pack: &MissionPack) -> Vec<String> {
    check_pack(pack).0
}

/// Violations plus the goals that parsed, in mission order.
fn check_pack(pack: &MissionPack) -> (Vec<String>, Vec<GoalNode>) {
    let mut errors = Vec::new();
    let mut goals = Vec::with_capacity(pack.missions.len());
    if pack.version != PACK_VERSION {
        errors.push(format!(
            "unsupported pack version {} (expected {PACK_VERSION})",
            pack.version
        ));
    }
    let mut seen = BTreeSet::new();
    for (idx, mission) in pack.missions.iter().enumerate() {
        let label = if mission.id.is_empty() {
            format!("missions[{idx}]")
        } else {
            mission.id.clone()
        };
        if mission.id.trim().is_empty() {
            errors.push(format!("{label}: id must be non-empty"));
        } else if !seen.insert(mission.id.as_str()) {
            errors.push(format!("duplicate id: {}", mission.id));
        }
        if mission.briefing.trim().is_empty() {
            errors.push(format!("{label}: briefing must be non-empty"));
        }
        if mission.level > MAX_LEVEL {
            errors.push(format!(
                "{label}: level {} exceeds {MAX_LEVEL}",
                mission.level
            ));
        }
        match GoalNode::parse(&mission.goal) {
            Ok(goal) => goals.push(goal),
            Err(err) => errors.push(format!("{label}: goal: {err}")),
        }
    }
    (errors, goals)
}

/// Missions in pack order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    missions: Vec<Mission>,
}

impl Catalog {
    /// Validate a pack and parse every goal.
    pub fn from_pack(pack: MissionPack) -> Result<Self, PackError> {
        let (errors, goals) = check_pack(&pack);
        if !errors.is_empty() {
            return Err(PackError::Invariants(errors));
        }
        let missions = pack
            .missions
            .into_iter()
            .zip(goals)
            .map(|(def, goal)| Mission::with_goal(def, goal))
            .collect();
        Ok(Self { missions })
    }

    pub fn from_json(raw: &str) -> Result<Self, PackError> {
        let pack: MissionPack = serde_json::from_str(raw)?;
        Self::from_pack(pack)
    }

    pub fn builtin() -> Result<Self, PackError> {
        Self::from_json(BUILTIN_PACK)
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn get(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == id)
    }

    /// Missions matching both filters; `None` matches everything.
    pub fn filter(&self, level: Option<u8>, skill: Option<&str>) -> Vec<&Mission> {
        self.missions
            .iter()
            .filter(|mission| level.is_none_or(|level| mission.level == level))
            .filter(|mission| skill.is_none_or(|skill| mission.skill_id == skill))
            .collect()
    }

    /// Distinct skill ids, sorted.
    pub fn skills(&self) -> Vec<&str> {
        let skills: BTreeSet<&str> = self
            .missions
            .iter()
            .map(|mission| mission.skill_id.as_str())
            .collect();
        skills.into_iter().collect()
    }
}
