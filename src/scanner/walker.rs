use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use super::catalog::FileEntry;
use crate::common::safety::PathValidator;

/// How far below a search root the named-directory finder descends.
const NAMED_DIR_MAX_DEPTH: usize = 5;

/// Subtrees the large-file finder never enters: dependency folders, trash,
/// build output, caches. They are covered by their own categories and only
/// add noise here.
const NOISY_DIRS: &[&str] = &[
    "node_modules",
    ".Trash",
    "DerivedData",
    "Library",
    ".git",
    "Caches",
    "CoreSimulator",
];

/// Result of aggregating one scan root.
#[derive(Debug, Default)]
pub struct RootAggregate {
    pub total_size: u64,
    pub entries: Vec<FileEntry>,
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Recursively aggregates a directory, rolling sizes up to one level of
/// depth: one `FileEntry` per immediate child of the root, each carrying the
/// recursive size of everything beneath it.
///
/// Hidden entries are skipped entirely. Symlinks are never followed and
/// never recursed into, which prevents cycles and double-counted space.
/// When an entry is seen more than once for a top-level child, the
/// first-seen directory flag and date win while sizes accumulate.
pub fn aggregate_root(root: &Path) -> RootAggregate {
    let mut sizes: HashMap<PathBuf, u64> = HashMap::new();
    let mut first_seen: HashMap<PathBuf, (SystemTime, bool)> = HashMap::new();
    let mut total_size = 0u64;

    let mut walker = WalkDir::new(root).follow_links(false).min_depth(1).into_iter();
    while let Some(result) = walker.next() {
        let entry = match result {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if is_hidden(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.path_is_symlink() {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => continue,
        };

        let top_level = match entry
            .path()
            .strip_prefix(root)
            .ok()
            .and_then(|rel| rel.components().next().map(|c| root.join(c.as_os_str())))
        {
            Some(path) => path,
            None => continue,
        };

        let size = if meta.is_file() { meta.len() } else { 0 };
        total_size += size;
        *sizes.entry(top_level.clone()).or_insert(0) += size;
        first_seen
            .entry(top_level)
            .or_insert_with(|| (meta.modified().unwrap_or(SystemTime::UNIX_EPOCH), meta.is_dir()));
    }

    let mut entries: Vec<FileEntry> = sizes
        .into_iter()
        .filter(|(_, size)| *size > 0)
        .map(|(path, size)| {
            let (modified, is_dir) = first_seen
                .get(&path)
                .copied()
                .unwrap_or((SystemTime::UNIX_EPOCH, false));
            FileEntry::new(path, size, modified, is_dir)
        })
        .collect();
    entries.sort_by(|a, b| b.size.cmp(&a.size));

    RootAggregate { total_size, entries }
}

/// Total recursive size of a directory, with the same hidden/symlink policy
/// as `aggregate_root`.
pub fn dir_size(path: &Path) -> u64 {
    let mut size = 0u64;
    let mut walker = WalkDir::new(path).follow_links(false).into_iter();
    while let Some(result) = walker.next() {
        let entry = match result {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if is_hidden(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.path_is_symlink() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            if meta.is_file() {
                size += meta.len();
            }
        }
    }
    size
}

/// Searches each level below `root` (down to a bounded depth) for
/// directories with the exact reserved `target_name`. A match is sized as
/// one atomic unit and not entered; siblings are still searched.
pub fn find_named_dirs(root: &Path, target_name: &str) -> Vec<FileEntry> {
    let mut found: Vec<PathBuf> = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .max_depth(NAMED_DIR_MAX_DEPTH)
        .into_iter();
    while let Some(result) = walker.next() {
        let entry = match result {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if is_hidden(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.path_is_symlink() {
            continue;
        }
        if entry.file_type().is_dir() && entry.file_name().to_string_lossy() == target_name {
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    let mut entries: Vec<FileEntry> = found
        .par_iter()
        .map(|path| {
            let size = dir_size(path);
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let parent = path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            FileEntry::new(path.clone(), size, modified, true)
                .with_name(format!("{target_name} ({parent})"))
        })
        .collect();
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries
}

/// Collects individual files at or above `threshold` bytes, skipping noisy
/// subtrees along the way. Directories are never reported as a unit here.
/// Returns at most `cap` results, largest first.
pub fn find_large_files(root: &Path, threshold: u64, cap: usize) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = Vec::new();
    let mut walker = WalkDir::new(root).follow_links(false).min_depth(1).into_iter();
    while let Some(result) = walker.next() {
        let entry = match result {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if NOISY_DIRS.contains(&name.as_ref()) || is_hidden(&entry) {
                walker.skip_current_dir();
            }
            continue;
        }
        if is_hidden(&entry) || entry.path_is_symlink() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            if meta.len() >= threshold {
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                entries.push(FileEntry::new(entry.into_path(), meta.len(), modified, false));
            }
        }
    }
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries.truncate(cap);
    entries
}

/// Immediate children of `root` whose last-modified time falls strictly
/// before `cutoff`. Only top-level items are candidates; a directory's
/// reported size is still its full recursive sum.
pub fn find_stale_entries(root: &Path, cutoff: SystemTime) -> Vec<FileEntry> {
    let read_dir = match fs::read_dir(root) {
        Ok(read_dir) => read_dir,
        Err(_) => return Vec::new(),
    };

    let mut entries: Vec<FileEntry> = Vec::new();
    for child in read_dir.filter_map(|e| e.ok()) {
        let path = child.path();
        if child.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if meta.file_type().is_symlink() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if modified >= cutoff {
            continue;
        }
        let size = if meta.is_dir() { dir_size(&path) } else { meta.len() };
        entries.push(FileEntry::new(path, size, modified, meta.is_dir()));
    }
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries
}

/// One-level-deep expansion primitive: the immediate children of a
/// directory, validated safe, existing, and non-symlink, each with its
/// computed size (recursive for directories). Zero-size children are
/// omitted. This is the expensive call the lazy tree defers until the user
/// actually drills down.
pub fn list_children(path: &Path, validator: &PathValidator) -> Vec<FileEntry> {
    if !validator.is_safe(path) {
        return Vec::new();
    }
    let read_dir = match fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(_) => return Vec::new(),
    };

    let candidates: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();

    let mut entries: Vec<FileEntry> = candidates
        .par_iter()
        .filter_map(|child| {
            let meta = fs::symlink_metadata(child).ok()?;
            if meta.file_type().is_symlink() {
                return None;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let size = if meta.is_dir() { dir_size(child) } else { meta.len() };
            if size == 0 {
                return None;
            }
            Some(FileEntry::new(child.clone(), size, modified, meta.is_dir()))
        })
        .collect();
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries
}
