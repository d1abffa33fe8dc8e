use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::common::config::Settings;
use crate::scanner::catalog::Category;

/// Snapshots kept before the oldest is evicted.
pub const MAX_SNAPSHOTS: usize = 30;

/// Immutable record of one full scan: when it ran, how much was cleanable,
/// and how the total broke down per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub total_cleanable_bytes: u64,
    pub category_sizes: BTreeMap<String, u64>,
}

impl ScanSnapshot {
    pub fn capture(total_cleanable_bytes: u64, categories: &[Category]) -> Self {
        let category_sizes = categories
            .iter()
            .map(|c| (c.name().to_string(), c.total_size))
            .collect();
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            total_cleanable_bytes,
            category_sizes,
        }
    }
}

/// Bounded scan history, persisted as a single JSON blob.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the engine's default location under the data directory.
    pub fn default_store() -> Self {
        Self::new(Settings::history_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the history, oldest first. Missing or unreadable history is an
    /// empty list, never an error.
    pub fn load(&self) -> Vec<ScanSnapshot> {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    /// Appends a snapshot, evicting the oldest entries beyond the cap.
    pub fn append(&self, snapshot: ScanSnapshot) -> Result<()> {
        let mut snapshots = self.load();
        snapshots.push(snapshot);
        if snapshots.len() > MAX_SNAPSHOTS {
            let excess = snapshots.len() - MAX_SNAPSHOTS;
            snapshots.drain(..excess);
        }

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create history dir: {}", dir.display()))?;
        }
        let contents =
            serde_json::to_string(&snapshots).context("Failed to serialize scan history")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write history: {}", self.path.display()))?;
        Ok(())
    }
}
