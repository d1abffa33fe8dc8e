use std::path::PathBuf;
use thiserror::Error;

/// Per-item failures raised while deleting.
///
/// Every variant is recoverable: the cleanup engine records the message,
/// contributes zero freed bytes for the item, and moves on to the next one.
/// Nothing here ever aborts a batch.
#[derive(Debug, Error)]
pub enum CleanError {
    /// Target failed the safety validator at deletion time.
    #[error("Blocked unsafe path: {}", .0.display())]
    UnsafePath(PathBuf),

    /// Target is a symlink whose resolved destination is unsafe.
    #[error("Dangerous symlink detected: {}", .0.display())]
    DangerousSymlink(PathBuf),

    /// Target vanished between scan time and delete time.
    #[error("File no longer exists: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The OS denied the delete.
    #[error("Permission denied: {}. Grant Full Disk Access in System Settings and retry.", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other deletion failure, surfaced verbatim with the item named.
    #[error("{0}")]
    Other(String),
}
