//! Mission pack loading with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use super::init::{DojoPaths, PACK_SCHEMA};
use crate::mission::{Catalog, MissionPack};

/// Load the workspace catalog, falling back to the built-in pack when
/// `.termdojo/missions.json` does not exist.
pub fn load_catalog(paths: &DojoPaths) -> Result<Catalog> {
    if !paths.missions_path.exists() {
        debug!("no mission pack on disk, using built-in catalog");
        return Catalog::builtin().context("load built-in mission pack");
    }
    let schema = if paths.schema_path.exists() {
        fs::read_to_string(&paths.schema_path)
            .with_context(|| format!("read schema {}", paths.schema_path.display()))?
    } else {
        PACK_SCHEMA.to_string()
    };
    load_pack(&schema, &paths.missions_path)
}

/// Load and validate a pack from disk (schema, then invariants, then goals).
pub fn load_pack(schema: &str, pack_path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(pack_path)
        .with_context(|| format!("read mission pack {}", pack_path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse mission pack {}", pack_path.display()))?;
    validate_schema(schema, &value)?;
    let pack: MissionPack = serde_json::from_value(value)
        .with_context(|| format!("deserialize mission pack {}", pack_path.display()))?;
    let count = pack.missions.len();
    let catalog = Catalog::from_pack(pack)?;
    debug!(path = %pack_path.display(), count, "mission pack loaded");
    Ok(catalog)
}

fn validate_schema(schema: &str, pack: &Value) -> Result<()> {
    let schema_value: Value = serde_json::from_str(schema).context("parse mission pack schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(pack) {
        let messages = compiled
            .iter_errors(pack)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "mission pack schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
