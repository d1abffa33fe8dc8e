pub mod catalog;
pub mod tree;
pub mod walker;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::common::config::Settings;
use crate::common::format;
use crate::common::safety::PathValidator;
use crate::disk::DiskInfo;
use catalog::{Category, CategoryId, FileEntry, ScanStrategy};

/// Noise floor for entries inside Application Support.
const SYSTEM_DATA_MIN_BYTES: u64 = 10_000_000;
/// Higher floor for the short fixed list of other known data locations.
const AUX_DATA_MIN_BYTES: u64 = 1_000_000;
/// Result caps for the unbounded finders.
const SYSTEM_DATA_CAP: usize = 50;
const LARGE_FILE_CAP: usize = 50;

/// Other known data locations inspected by the system-data strategy,
/// with the display labels collaborators show for them.
const AUX_DATA_ROOTS: &[(&str, &str)] = &[
    ("Library/Containers", "App Containers"),
    ("Library/Group Containers", "Group Containers"),
    ("Library/Saved Application State", "Saved App State"),
    ("Library/WebKit", "WebKit Data"),
];

/// Outcome of scanning one category.
#[derive(Debug, Default)]
pub struct CategoryScan {
    pub total_size: u64,
    pub entries: Vec<FileEntry>,
    /// Advisory for degraded scans (e.g. an unreadable root). The category
    /// still yields a result; scanning of other categories continues.
    pub error: Option<String>,
}

/// Aggregate result of a full scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanSummary {
    /// Sum over safe-to-clean categories, clamped so it never exceeds the
    /// used space on disk.
    pub total_cleanable: u64,
    pub disk: DiskInfo,
}

/// Per-category progress reported during a full scan.
#[derive(Debug, Clone, Copy)]
pub enum ScanProgress {
    Started(CategoryId),
    Finished { id: CategoryId, total_size: u64 },
}

/// Dispatches each category to its scan strategy and aggregates results.
///
/// The engine owns the session-scoped set of already-scanned paths, which
/// keeps overlapping roots from being counted twice across categories.
/// Callers must serialize access (one scan at a time); moving the engine
/// into a single worker thread is the intended way to get that for free.
#[derive(Debug)]
pub struct ScanEngine {
    validator: PathValidator,
    home: PathBuf,
    stale_days: u32,
    large_file_threshold: u64,
    scanned_paths: HashSet<PathBuf>,
}

impl ScanEngine {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self::with_settings(home, &Settings::default())
    }

    pub fn with_settings(home: impl Into<PathBuf>, settings: &Settings) -> Self {
        let home = home.into();
        Self {
            validator: PathValidator::new(&home),
            home,
            stale_days: settings.stale_days,
            large_file_threshold: settings.large_file_threshold_bytes(),
            scanned_paths: HashSet::new(),
        }
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resets the dedup bookkeeping. Called at the start of every full
    /// scan; single-category rescans between full scans keep the session.
    pub fn begin_session(&mut self) {
        self.scanned_paths.clear();
    }

    /// Scans one category with the strategy its identity selects.
    pub fn scan_category(&mut self, id: CategoryId) -> CategoryScan {
        debug!(category = %id, "scanning");
        let roots = id.scan_roots(&self.home);
        match id.strategy() {
            ScanStrategy::Aggregate => self.scan_aggregate_roots(&roots),
            ScanStrategy::NamedDir(name) => self.scan_named_dirs(&roots, name),
            ScanStrategy::LargeFiles => self.scan_large_files(&roots),
            ScanStrategy::StaleDownloads => {
                let cutoff = SystemTime::now()
                    - Duration::from_secs(u64::from(self.stale_days) * 86_400);
                self.scan_stale(&roots, cutoff)
            }
            ScanStrategy::SystemData => self.scan_system_data(),
        }
    }

    /// Generic aggregation over a list of roots. Public so collaborators can
    /// aggregate ad-hoc locations with the same dedup bookkeeping.
    pub fn scan_aggregate_roots(&mut self, roots: &[PathBuf]) -> CategoryScan {
        let mut scan = CategoryScan::default();
        for root in roots {
            if !self.validator.is_safe(root) {
                debug!(root = %root.display(), "skipped: failed safety check");
                continue;
            }
            if !root.exists() {
                continue;
            }
            if self.already_counted(root) {
                debug!(root = %root.display(), "skipped: already counted this session");
                continue;
            }
            if let Err(e) = fs::read_dir(root) {
                scan.error = Some(format!("Cannot read {}: {e}", format::format_path(root)));
                continue;
            }
            self.scanned_paths.insert(root.clone());

            let agg = walker::aggregate_root(root);
            scan.total_size += agg.total_size;
            scan.entries.extend(agg.entries);
        }
        scan.entries.sort_by(|a, b| b.size.cmp(&a.size));
        scan
    }

    fn scan_named_dirs(&mut self, roots: &[PathBuf], name: &str) -> CategoryScan {
        let mut entries: Vec<FileEntry> = Vec::new();
        for root in roots {
            if !root.exists() {
                continue;
            }
            entries.extend(walker::find_named_dirs(root, name));
        }
        entries.sort_by(|a, b| b.size.cmp(&a.size));
        let total_size = entries.iter().map(|e| e.size).sum();
        CategoryScan { total_size, entries, error: None }
    }

    fn scan_large_files(&mut self, roots: &[PathBuf]) -> CategoryScan {
        let mut entries: Vec<FileEntry> = Vec::new();
        for root in roots {
            if !root.exists() {
                continue;
            }
            entries.extend(walker::find_large_files(root, self.large_file_threshold, LARGE_FILE_CAP));
        }
        entries.sort_by(|a, b| b.size.cmp(&a.size));
        entries.truncate(LARGE_FILE_CAP);
        let total_size = entries.iter().map(|e| e.size).sum();
        CategoryScan { total_size, entries, error: None }
    }

    fn scan_stale(&mut self, roots: &[PathBuf], cutoff: SystemTime) -> CategoryScan {
        let mut entries: Vec<FileEntry> = Vec::new();
        for root in roots {
            if !root.exists() {
                continue;
            }
            entries.extend(walker::find_stale_entries(root, cutoff));
        }
        entries.sort_by(|a, b| b.size.cmp(&a.size));
        let total_size = entries.iter().map(|e| e.size).sum();
        CategoryScan { total_size, entries, error: None }
    }

    /// Enumerates application data containers one level deep, keeping only
    /// entries above the noise floors, deduplicated against paths other
    /// categories already claimed this session.
    fn scan_system_data(&mut self) -> CategoryScan {
        let mut scan = CategoryScan::default();

        let app_support = self.home.join("Library/Application Support");
        if let Ok(read_dir) = fs::read_dir(&app_support) {
            for child in read_dir.filter_map(|e| e.ok()) {
                let name = child.file_name().to_string_lossy().into_owned();
                // MobileSync belongs to the iOS Backups category.
                if name.starts_with('.') || name == "MobileSync" {
                    continue;
                }
                let path = child.path();
                let size = walker::dir_size(&path);
                if size <= SYSTEM_DATA_MIN_BYTES {
                    continue;
                }
                let modified = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                scan.total_size += size;
                scan.entries.push(FileEntry::new(path, size, modified, true));
            }
        }

        for (sub, label) in AUX_DATA_ROOTS {
            let path = self.home.join(sub);
            if !path.exists() || self.already_counted(&path) {
                continue;
            }
            let size = self.aux_root_size(&path);
            if size <= AUX_DATA_MIN_BYTES {
                continue;
            }
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            scan.total_size += size;
            scan.entries.push(FileEntry::new(path, size, modified, true).with_name(*label));
        }

        scan.entries.sort_by(|a, b| b.size.cmp(&a.size));
        scan.entries.truncate(SYSTEM_DATA_CAP);
        scan
    }

    /// Runs every given category in order, updating each one in place, and
    /// returns the clamped total. The caller decides which categories to
    /// pass (excluded ones simply never reach the engine).
    pub fn scan_all(
        &mut self,
        categories: &mut [Category],
        mut progress: impl FnMut(ScanProgress),
    ) -> ScanSummary {
        self.begin_session();

        for category in categories.iter_mut() {
            progress(ScanProgress::Started(category.id));
            category.is_scanning = true;

            let scan = self.scan_category(category.id);
            category.total_size = scan.total_size;
            category.entries = scan.entries;
            category.last_error = scan.error;
            category.is_scanning = false;

            progress(ScanProgress::Finished {
                id: category.id,
                total_size: category.total_size,
            });
        }

        let raw_total: u64 = categories
            .iter()
            .filter(|c| c.safe_to_clean())
            .map(|c| c.total_size)
            .sum();
        let disk = DiskInfo::current(&self.home);
        ScanSummary {
            total_cleanable: disk.clamp_to_used(raw_total),
            disk,
        }
    }

    /// Recursive size of an aux data root, minus any subtree that belongs to
    /// another category's scan roots. Those bytes stay with their own
    /// category even when it scans later in the session; the aux root itself
    /// is never claimed in the session set, so it cannot shadow a nested
    /// category root.
    fn aux_root_size(&self, root: &Path) -> u64 {
        let claimed: u64 = CategoryId::ALL
            .iter()
            .filter(|id| **id != CategoryId::SystemData)
            .flat_map(|id| id.scan_roots(&self.home))
            .filter(|r| r.starts_with(root))
            .map(|r| walker::dir_size(&r))
            .sum();
        walker::dir_size(root).saturating_sub(claimed)
    }

    /// True when the subtree's bytes were already claimed this session,
    /// either because the path sits under a scanned root or because a
    /// scanned root sits under it.
    fn already_counted(&self, path: &Path) -> bool {
        self.scanned_paths
            .iter()
            .any(|seen| path.starts_with(seen) || seen.starts_with(path))
    }
}
