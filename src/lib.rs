//! # diskweep
//!
//! A safety-first disk space scan-and-clean engine for macOS.
//!
//! diskweep scans a fixed catalog of well-known reclaimable-space locations
//! (caches, logs, trash, build artifacts, dependency folders, large and
//! stale files), reports per-category sizes, and performs guarded deletion
//! of selected items. It features:
//!
//! - **Path safety as a hard gate**: every path is validated against an
//!   explicit denylist and confined to the user's home directory, at scan
//!   time and again at delete time
//! - **One-level roll-up**: directory walks report one sized entry per
//!   top-level child, so the biggest folders surface without flooding
//!   callers with leaf files
//! - **Cross-category dedup**: overlapping scan roots are counted once per
//!   scan session
//! - **Per-item failure semantics**: a failed delete is recorded and
//!   skipped, never aborting the batch
//! - **Lazy drill-down**: child sizes are computed only when a caller
//!   expands a directory node
//! - **Bounded scan history**: the last 30 scan snapshots, persisted as one
//!   JSON blob
//!
//! The crate is a pure engine: no UI, no CLI, no network. Hosts drive it
//! through [`ScanEngine`], [`CleanupEngine`], and the [`worker`] handles.

pub mod cleaner;
pub mod common;
pub mod disk;
pub mod history;
pub mod scanner;
pub mod worker;

pub use cleaner::{CleanOutcome, CleanStatus, CleanupEngine};
pub use common::config::Settings;
pub use common::errors::CleanError;
pub use common::safety::PathValidator;
pub use disk::{DiskInfo, UsageLevel};
pub use history::{ScanSnapshot, SnapshotStore};
pub use scanner::catalog::{Category, CategoryId, FileEntry, ScanStrategy};
pub use scanner::tree::{FileTree, NodeId, TreeNode};
pub use scanner::{CategoryScan, ScanEngine, ScanProgress, ScanSummary};
