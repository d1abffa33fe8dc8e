//! Background execution for the long-running, I/O-bound engine operations.
//!
//! Each spawn moves the engine into a single worker thread; ownership is
//! the serialization guarantee (no two scans, and no scan plus clean, can
//! race on the same engine's dedup set or category results). Callers keep
//! their own thread of control and either poll the event channel or block
//! on `join`. Operations are not cancellable mid-walk.

use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::cleaner::{CleanOutcome, CleanupEngine};
use crate::history::{ScanSnapshot, SnapshotStore};
use crate::scanner::catalog::{Category, CategoryId, FileEntry};
use crate::scanner::{ScanEngine, ScanProgress, ScanSummary};

/// Incremental progress emitted during a full scan.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent {
    CategoryStarted {
        id: CategoryId,
    },
    CategoryFinished {
        id: CategoryId,
        total_size: u64,
        completed: usize,
        total: usize,
    },
    Finished {
        summary: ScanSummary,
    },
}

/// Handle to an in-flight full scan.
pub struct ScanTask {
    pub events: mpsc::Receiver<ScanEvent>,
    handle: thread::JoinHandle<(Vec<Category>, ScanSummary)>,
}

impl ScanTask {
    /// Blocks until the scan completes and returns the updated category
    /// table plus the summary.
    pub fn join(self) -> Result<(Vec<Category>, ScanSummary)> {
        self.handle.join().map_err(|_| anyhow!("scan worker panicked"))
    }
}

/// Runs a full scan on a background thread. The caller passes only the
/// categories it wants scanned (excluded ones never reach the engine).
/// When a snapshot store is given, a `ScanSnapshot` is appended after the
/// scan completes.
pub fn spawn_scan(
    mut engine: ScanEngine,
    mut categories: Vec<Category>,
    snapshots: Option<SnapshotStore>,
) -> ScanTask {
    let (tx, events) = mpsc::channel();

    let handle = thread::spawn(move || {
        let total = categories.len();
        let mut completed = 0usize;
        let summary = engine.scan_all(&mut categories, |progress| match progress {
            ScanProgress::Started(id) => {
                let _ = tx.send(ScanEvent::CategoryStarted { id });
            }
            ScanProgress::Finished { id, total_size } => {
                completed += 1;
                let _ = tx.send(ScanEvent::CategoryFinished {
                    id,
                    total_size,
                    completed,
                    total,
                });
            }
        });

        if let Some(store) = snapshots {
            let snapshot = ScanSnapshot::capture(summary.total_cleanable, &categories);
            if let Err(e) = store.append(snapshot) {
                warn!(error = %e, "failed to persist scan snapshot");
            }
        }

        let _ = tx.send(ScanEvent::Finished { summary });
        (categories, summary)
    });

    ScanTask { events, handle }
}

/// Handle to an in-flight cleanup batch.
pub struct CleanTask {
    handle: thread::JoinHandle<CleanOutcome>,
}

impl CleanTask {
    pub fn join(self) -> Result<CleanOutcome> {
        self.handle.join().map_err(|_| anyhow!("clean worker panicked"))
    }
}

/// Deletes the given entries on a background thread.
pub fn spawn_clean(engine: CleanupEngine, entries: Vec<FileEntry>, move_to_trash: bool) -> CleanTask {
    let handle = thread::spawn(move || engine.clean_entries(&entries, move_to_trash));
    CleanTask { handle }
}

/// Empties the trash on a background thread.
pub fn spawn_empty_trash(engine: CleanupEngine) -> CleanTask {
    let handle = thread::spawn(move || engine.empty_trash());
    CleanTask { handle }
}
