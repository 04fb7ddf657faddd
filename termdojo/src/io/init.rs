//! Initialization helpers for `.termdojo/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{TrainerConfig, write_config};
use crate::mission::BUILTIN_PACK;

pub(crate) const PACK_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/mission_pack/v1.schema.json"
));

/// All canonical paths within `.termdojo/` for a project root.
#[derive(Debug, Clone)]
pub struct DojoPaths {
    pub root: PathBuf,
    pub dojo_dir: PathBuf,
    pub config_path: PathBuf,
    pub missions_path: PathBuf,
    pub schema_path: PathBuf,
}

impl DojoPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dojo_dir = root.join(".termdojo");
        Self {
            root,
            config_path: dojo_dir.join("config.toml"),
            missions_path: dojo_dir.join("missions.json"),
            schema_path: dojo_dir.join("schema.json"),
            dojo_dir,
        }
    }
}

/// Options for `init_dojo`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing files.
    pub force: bool,
}

/// Create `.termdojo/` scaffolding in `root`.
///
/// Fails if `.termdojo/` already exists unless `options.force` is set.
pub fn init_dojo(root: &Path, options: &InitOptions) -> Result<DojoPaths> {
    let paths = DojoPaths::new(root);
    if paths.dojo_dir.exists() && !paths.dojo_dir.is_dir() {
        return Err(anyhow!(
            "termdojo init: .termdojo exists but is not a directory"
        ));
    }
    if paths.dojo_dir.exists() && !options.force {
        return Err(anyhow!(
            "termdojo init: .termdojo already exists (use --force to overwrite)"
        ));
    }

    fs::create_dir_all(&paths.dojo_dir)
        .with_context(|| format!("create directory {}", paths.dojo_dir.display()))?;
    write_config(&paths.config_path, &TrainerConfig::default())?;
    write_file(&paths.missions_path, BUILTIN_PACK)?;
    write_file(&paths.schema_path, PACK_SCHEMA)?;

    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write file {}", path.display()))
}
