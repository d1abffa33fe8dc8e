use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::errors::CleanError;
use crate::common::safety::PathValidator;
use crate::scanner::catalog::{Category, FileEntry};
use crate::scanner::walker;

/// Tri-state classification of a cleanup batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanStatus {
    /// Every item was deleted.
    Success,
    /// Some bytes were freed, some items failed.
    Partial,
    /// At least one error and nothing freed.
    Failure,
}

/// Result of a deletion batch: freed bytes plus one human-readable string
/// per skipped or failed item. Deletion is not transactional; the outcome
/// reflects only the items actually attempted.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub freed_bytes: u64,
    pub errors: Vec<String>,
    pub status: CleanStatus,
}

impl CleanOutcome {
    fn from_parts(freed_bytes: u64, errors: Vec<String>) -> Self {
        let status = if errors.is_empty() {
            CleanStatus::Success
        } else if freed_bytes > 0 {
            CleanStatus::Partial
        } else {
            CleanStatus::Failure
        };
        Self { freed_bytes, errors, status }
    }

    pub fn is_success(&self) -> bool {
        self.status == CleanStatus::Success
    }
}

/// Validates and deletes file targets, enforcing safety checks at deletion
/// time rather than trusting scan-time verdicts.
#[derive(Debug)]
pub struct CleanupEngine {
    validator: PathValidator,
    trash_dir: PathBuf,
}

impl CleanupEngine {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let trash_dir = home.join(".Trash");
        Self {
            validator: PathValidator::new(home),
            trash_dir,
        }
    }

    /// Deletes each entry independently. Every item gets fresh safety,
    /// symlink, and existence checks (the filesystem can change between
    /// scan and delete); a failed item is recorded and skipped, never
    /// aborting the rest of the batch.
    pub fn clean_entries(&self, entries: &[FileEntry], move_to_trash: bool) -> CleanOutcome {
        let mut freed_bytes = 0u64;
        let mut errors: Vec<String> = Vec::new();

        for entry in entries {
            match self.clean_one(entry, move_to_trash) {
                Ok(()) => {
                    debug!(path = %entry.path.display(), size = entry.size, "deleted");
                    freed_bytes += entry.size;
                }
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "skipped");
                    errors.push(e.to_string());
                }
            }
        }

        CleanOutcome::from_parts(freed_bytes, errors)
    }

    fn clean_one(&self, entry: &FileEntry, move_to_trash: bool) -> Result<(), CleanError> {
        // Scan-time verdicts are never trusted here: re-resolve and
        // re-validate the path as it is on disk right now.
        if !self.validator.is_safe(&entry.path) {
            return Err(CleanError::UnsafePath(entry.path.clone()));
        }
        if !self.validator.is_not_dangerous_symlink(&entry.path) {
            return Err(CleanError::DangerousSymlink(entry.path.clone()));
        }
        let meta = fs::symlink_metadata(&entry.path)
            .map_err(|_| CleanError::FileNotFound(entry.path.clone()))?;

        if move_to_trash {
            trash::delete(&entry.path)
                .map_err(|e| CleanError::Other(format!("{}: {e}", entry.name)))
        } else {
            let removal = if meta.is_dir() {
                fs::remove_dir_all(&entry.path)
            } else {
                fs::remove_file(&entry.path)
            };
            removal.map_err(|e| match e.kind() {
                ErrorKind::NotFound => CleanError::FileNotFound(entry.path.clone()),
                ErrorKind::PermissionDenied => CleanError::PermissionDenied(entry.path.clone()),
                _ => CleanError::Other(format!("{}: {e}", entry.name)),
            })
        }
    }

    /// Cleans a category's user-selected entries, or all of its entries
    /// when nothing is individually selected.
    pub fn clean_category(&self, category: &Category, move_to_trash: bool) -> CleanOutcome {
        self.clean_entries(&category.entries_to_clean(), move_to_trash)
    }

    /// Cleans every category whose category-level selection flag is set,
    /// merging the per-category outcomes into one. Deselected categories
    /// are left untouched.
    pub fn clean_categories(&self, categories: &[Category], move_to_trash: bool) -> CleanOutcome {
        let mut freed_bytes = 0u64;
        let mut errors: Vec<String> = Vec::new();
        for category in categories.iter().filter(|c| c.is_selected) {
            let outcome = self.clean_category(category, move_to_trash);
            freed_bytes += outcome.freed_bytes;
            errors.extend(outcome.errors);
        }
        CleanOutcome::from_parts(freed_bytes, errors)
    }

    /// Empties the trash directory. Items here are definitionally already
    /// sanctioned for deletion, so the home allow-list check is skipped;
    /// the dangerous-symlink check still applies per item.
    pub fn empty_trash(&self) -> CleanOutcome {
        let read_dir = match fs::read_dir(&self.trash_dir) {
            Ok(read_dir) => read_dir,
            Err(_) => return CleanOutcome::from_parts(0, Vec::new()),
        };

        let mut freed_bytes = 0u64;
        let mut errors: Vec<String> = Vec::new();

        for child in read_dir.filter_map(|e| e.ok()) {
            let path = child.path();
            let name = child.file_name().to_string_lossy().into_owned();

            if !self.validator.is_not_dangerous_symlink(&path) {
                errors.push(format!("{name}: skipped dangerous symlink"));
                continue;
            }
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    errors.push(format!("{name}: {e}"));
                    continue;
                }
            };
            let size = if meta.is_dir() { walker::dir_size(&path) } else { meta.len() };

            let removal = if meta.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match removal {
                Ok(()) => freed_bytes += size,
                Err(e) => errors.push(format!("{name}: {e}")),
            }
        }

        CleanOutcome::from_parts(freed_bytes, errors)
    }

    pub fn trash_dir(&self) -> &Path {
        &self.trash_dir
    }
}
