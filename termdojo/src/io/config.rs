//! Trainer configuration stored under `.termdojo/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::filesystem::{DEFAULT_HOME, DEFAULT_USER};
use crate::core::path;

/// Trainer configuration (TOML).
///
/// Edited by humans. Missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrainerConfig {
    /// Account name shown by `ls -l` and written to `/etc/passwd`.
    pub user: String,

    /// Home directory inside the sandbox.
    pub home: String,

    /// Show the hint automatically after this many attempts without
    /// completion. `0` disables automatic hints.
    pub hint_after_attempts: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            home: DEFAULT_HOME.to_string(),
            hint_after_attempts: 3,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(anyhow!("user must be non-empty"));
        }
        if self.user.contains(['/', ':']) {
            return Err(anyhow!("user must not contain '/' or ':'"));
        }
        if !self.home.starts_with('/') {
            return Err(anyhow!("home must be an absolute path, got '{}'", self.home));
        }
        if path::normalize(&self.home) == path::ROOT {
            return Err(anyhow!("home must not be the root directory"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TrainerConfig::default()`.
pub fn load_config(path: &Path) -> Result<TrainerConfig> {
    if !path.exists() {
        return Ok(TrainerConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TrainerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TrainerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, TrainerConfig::default());
        assert_eq!(cfg.home, "/home/learner");
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let cfg = TrainerConfig {
            user: "ada".to_string(),
            home: "/home/ada".to_string(),
            hint_after_attempts: 0,
        };
        write_config(&path, &cfg).expect("write");
        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "hint_after_attempts = 5\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.hint_after_attempts, 5);
        assert_eq!(cfg.user, "learner");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            TrainerConfig {
                user: " ".to_string(),
                ..TrainerConfig::default()
            },
            TrainerConfig {
                home: "home/learner".to_string(),
                ..TrainerConfig::default()
            },
            TrainerConfig {
                home: "/".to_string(),
                ..TrainerConfig::default()
            },
            TrainerConfig {
                home: "/.".to_string(),
                ..TrainerConfig::default()
            },
            TrainerConfig {
                home: "/tmp/..".to_string(),
                ..TrainerConfig::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn validate_accepts_unnormalized_home_below_root() {
        let cfg = TrainerConfig {
            home: "/home//ada/".to_string(),
            ..TrainerConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_file_names_path_in_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "home = \"relative\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("home must be an absolute path"));
    }
}
