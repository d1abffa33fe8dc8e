use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

// ─── Category identities ──────────────────────────────────────────────────────

/// The fixed, closed set of cleanable categories. Per-identity behavior
/// (scan roots, strategy, safety flag) is dispatched by matching on the tag;
/// the variant set never grows at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    SystemCaches,
    ApplicationLogs,
    Trash,
    SystemData,
    Xcode,
    IosBackups,
    Docker,
    NodeModules,
    HomebrewCache,
    MailAttachments,
    LargeFiles,
    Downloads,
}

/// Which scan algorithm a category uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Recursive walk with per-top-level-child size roll-up.
    Aggregate,
    /// Bounded-depth search for directories with this exact reserved name.
    NamedDir(&'static str),
    /// Individual files at or above the size threshold.
    LargeFiles,
    /// Top-level items older than the staleness window.
    StaleDownloads,
    /// One-level enumeration of application data containers.
    SystemData,
}

impl CategoryId {
    /// Every identity, in scan order. Order matters for the cross-category
    /// dedup bookkeeping: earlier categories claim overlapping subtrees.
    pub const ALL: [CategoryId; 12] = [
        CategoryId::SystemCaches,
        CategoryId::ApplicationLogs,
        CategoryId::Trash,
        CategoryId::SystemData,
        CategoryId::Xcode,
        CategoryId::IosBackups,
        CategoryId::Docker,
        CategoryId::NodeModules,
        CategoryId::HomebrewCache,
        CategoryId::MailAttachments,
        CategoryId::LargeFiles,
        CategoryId::Downloads,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryId::SystemCaches => "System Caches",
            CategoryId::ApplicationLogs => "Application Logs",
            CategoryId::Trash => "Trash",
            CategoryId::SystemData => "System Data",
            CategoryId::Xcode => "Xcode",
            CategoryId::IosBackups => "iOS Backups",
            CategoryId::Docker => "Docker",
            CategoryId::NodeModules => "node_modules",
            CategoryId::HomebrewCache => "Homebrew Cache",
            CategoryId::MailAttachments => "Mail Attachments",
            CategoryId::LargeFiles => "Large Files",
            CategoryId::Downloads => "Downloads",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CategoryId::SystemCaches => "Browser and app caches",
            CategoryId::ApplicationLogs => "System and app log files",
            CategoryId::Trash => "Files in your Trash",
            CategoryId::SystemData => "App data, containers, and support files",
            CategoryId::Xcode => "DerivedData, simulators, archives",
            CategoryId::IosBackups => "Old iOS device backups",
            CategoryId::Docker => "Docker images and containers",
            CategoryId::NodeModules => "Node.js dependency folders",
            CategoryId::HomebrewCache => "Homebrew download cache",
            CategoryId::MailAttachments => "Downloaded mail attachments",
            CategoryId::LargeFiles => "Files larger than the size threshold",
            CategoryId::Downloads => "Old files in the Downloads folder",
        }
    }

    /// Whether the category may be cleaned without manual review.
    pub fn safe_to_clean(self) -> bool {
        match self {
            CategoryId::SystemCaches
            | CategoryId::ApplicationLogs
            | CategoryId::Trash
            | CategoryId::Xcode
            | CategoryId::IosBackups
            | CategoryId::Docker
            | CategoryId::NodeModules
            | CategoryId::HomebrewCache => true,
            CategoryId::SystemData
            | CategoryId::MailAttachments
            | CategoryId::LargeFiles
            | CategoryId::Downloads => false,
        }
    }

    pub fn strategy(self) -> ScanStrategy {
        match self {
            CategoryId::NodeModules => ScanStrategy::NamedDir("node_modules"),
            CategoryId::LargeFiles => ScanStrategy::LargeFiles,
            CategoryId::Downloads => ScanStrategy::StaleDownloads,
            CategoryId::SystemData => ScanStrategy::SystemData,
            _ => ScanStrategy::Aggregate,
        }
    }

    /// Root paths to scan, derived from the home directory. `SystemData`
    /// returns an empty list: its strategy enumerates application data
    /// containers directly.
    pub fn scan_roots(self, home: &Path) -> Vec<PathBuf> {
        match self {
            CategoryId::SystemCaches => vec![home.join("Library/Caches")],
            CategoryId::ApplicationLogs => vec![home.join("Library/Logs")],
            CategoryId::Trash => vec![home.join(".Trash")],
            CategoryId::SystemData => vec![],
            CategoryId::Xcode => vec![
                home.join("Library/Developer/Xcode/DerivedData"),
                home.join("Library/Developer/Xcode/Archives"),
                home.join("Library/Developer/Xcode/iOS DeviceSupport"),
                home.join("Library/Developer/CoreSimulator/Devices"),
            ],
            CategoryId::IosBackups => {
                vec![home.join("Library/Application Support/MobileSync/Backup")]
            }
            CategoryId::Docker => vec![
                home.join("Library/Containers/com.docker.docker"),
                home.join(".docker"),
            ],
            CategoryId::NodeModules => vec![
                home.join("Projects"),
                home.join("Developer"),
                home.join("Documents"),
                home.join("Desktop"),
            ],
            CategoryId::HomebrewCache => vec![home.join("Library/Caches/Homebrew")],
            CategoryId::MailAttachments => vec![home.join("Library/Mail")],
            CategoryId::LargeFiles => vec![home.to_path_buf()],
            CategoryId::Downloads => vec![home.join("Downloads")],
        }
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Scan result units ────────────────────────────────────────────────────────

/// One scannable unit: a top-level file or directory under a scan root.
/// Created fresh on every scan, never persisted.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Stable key for collaborators that diff result lists.
    pub id: Uuid,
    pub path: PathBuf,
    pub name: String,
    /// Recursive size for directories.
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
    pub is_selected: bool,
}

impl FileEntry {
    pub fn new(path: PathBuf, size: u64, modified: SystemTime, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id: Uuid::new_v4(),
            path,
            name,
            size,
            modified,
            is_dir,
            is_selected: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A category plus its mutable scan state. One instance per identity,
/// created at startup and updated in place by each scan.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub total_size: u64,
    pub entries: Vec<FileEntry>,
    pub is_scanning: bool,
    pub is_selected: bool,
    /// Advisory from the last scan, e.g. an unreadable root.
    pub last_error: Option<String>,
}

impl Category {
    pub fn new(id: CategoryId) -> Self {
        Self {
            id,
            total_size: 0,
            entries: Vec::new(),
            is_scanning: false,
            is_selected: true,
            last_error: None,
        }
    }

    /// The full category table in scan order.
    pub fn all() -> Vec<Category> {
        CategoryId::ALL.iter().copied().map(Category::new).collect()
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn safe_to_clean(&self) -> bool {
        self.id.safe_to_clean()
    }

    /// Entries the user has individually ticked. When none are ticked, a
    /// clean of this category covers all entries.
    pub fn selected_entries(&self) -> Vec<&FileEntry> {
        self.entries.iter().filter(|e| e.is_selected).collect()
    }

    /// What a category-level clean operates on: selected entries if any,
    /// otherwise the whole category.
    pub fn entries_to_clean(&self) -> Vec<FileEntry> {
        let selected: Vec<FileEntry> =
            self.entries.iter().filter(|e| e.is_selected).cloned().collect();
        if selected.is_empty() {
            self.entries.clone()
        } else {
            selected
        }
    }

    pub fn select_all(&mut self, selected: bool) {
        for entry in &mut self.entries {
            entry.is_selected = selected;
        }
    }

    pub fn toggle_entry(&mut self, entry_id: Uuid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) {
            entry.is_selected = !entry.is_selected;
        }
    }
}
