use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::scanner::catalog::CategoryId;

/// Engine settings persisted by the host application.
///
/// The scan and cleanup engines read thresholds from here; the excluded
/// category set is honored by the caller, which simply never asks the scan
/// engine for an excluded category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Reversible move-to-trash instead of permanent deletion.
    #[serde(default = "default_move_to_trash")]
    pub move_to_trash: bool,

    /// Downloads older than this many days are flagged as stale.
    #[serde(default = "default_stale_days")]
    pub stale_days: u32,

    /// Large-file finder threshold in MB.
    #[serde(default = "default_large_file_mb")]
    pub large_file_threshold_mb: u64,

    /// Categories the user has opted out of scanning.
    #[serde(default)]
    pub excluded_categories: BTreeSet<CategoryId>,
}

fn default_move_to_trash() -> bool {
    true
}
fn default_stale_days() -> u32 {
    30
}
fn default_large_file_mb() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            move_to_trash: default_move_to_trash(),
            stale_days: default_stale_days(),
            large_file_threshold_mb: default_large_file_mb(),
            excluded_categories: BTreeSet::new(),
        }
    }
}

impl Settings {
    /// Engine data directory (~/.diskweep).
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".diskweep")
    }

    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Location of the serialized scan snapshot history.
    pub fn history_path() -> PathBuf {
        Self::data_dir().join("history.json")
    }

    /// Load settings from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create settings dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }

    pub fn large_file_threshold_bytes(&self) -> u64 {
        self.large_file_threshold_mb * 1024 * 1024
    }

    pub fn is_excluded(&self, id: CategoryId) -> bool {
        self.excluded_categories.contains(&id)
    }

    pub fn set_excluded(&mut self, id: CategoryId, excluded: bool) {
        if excluded {
            self.excluded_categories.insert(id);
        } else {
            self.excluded_categories.remove(&id);
        }
    }
}
