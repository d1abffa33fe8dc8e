use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use diskweep::cleaner::{CleanStatus, CleanupEngine};
use diskweep::scanner::catalog::{Category, CategoryId, FileEntry};
use diskweep::worker;

fn temp_home() -> (tempfile::TempDir, PathBuf) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().canonicalize().unwrap();
    (dir, home)
}

fn write_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![0u8; len]).unwrap();
}

fn entry_for(path: &Path, size: u64) -> FileEntry {
    let is_dir = path.is_dir();
    FileEntry::new(path.to_path_buf(), size, SystemTime::now(), is_dir)
}

#[test]
fn deletes_files_and_directories_permanently() {
    let (_dir, home) = temp_home();
    write_file(&home.join("cache/a.bin"), 100);
    write_file(&home.join("cache/nested/b.bin"), 50);
    write_file(&home.join("log.txt"), 200);

    let engine = CleanupEngine::new(&home);
    let entries = vec![
        entry_for(&home.join("cache"), 150),
        entry_for(&home.join("log.txt"), 200),
    ];

    let outcome = engine.clean_entries(&entries, false);
    assert_eq!(outcome.status, CleanStatus::Success);
    assert_eq!(outcome.freed_bytes, 350);
    assert!(outcome.errors.is_empty());
    assert!(!home.join("cache").exists());
    assert!(!home.join("log.txt").exists());
}

#[test]
fn vanished_item_yields_partial_outcome() {
    let (_dir, home) = temp_home();
    write_file(&home.join("a.bin"), 100);
    write_file(&home.join("b.bin"), 200);

    let engine = CleanupEngine::new(&home);
    let entries = vec![
        entry_for(&home.join("a.bin"), 100),
        entry_for(&home.join("gone.bin"), 999),
        entry_for(&home.join("b.bin"), 200),
    ];

    let outcome = engine.clean_entries(&entries, false);
    assert_eq!(outcome.status, CleanStatus::Partial);
    // Only bytes actually deleted are counted.
    assert_eq!(outcome.freed_bytes, 300);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("gone.bin"));
}

#[test]
fn refuses_paths_outside_the_home_directory() {
    let (_dir, home) = temp_home();
    let (other_dir, other) = temp_home();
    write_file(&other.join("foreign.bin"), 100);

    let engine = CleanupEngine::new(&home);
    let outcome = engine.clean_entries(&[entry_for(&other.join("foreign.bin"), 100)], false);

    assert_eq!(outcome.status, CleanStatus::Failure);
    assert_eq!(outcome.freed_bytes, 0);
    assert_eq!(outcome.errors.len(), 1);
    // The foreign file was never touched.
    assert!(other.join("foreign.bin").exists());
    drop(other_dir);
}

#[cfg(unix)]
#[test]
fn revalidates_paths_that_changed_since_the_scan() {
    use std::os::unix::fs::symlink;

    let (_dir, home) = temp_home();
    let target = home.join("cache.bin");
    write_file(&target, 100);

    // Captured while the path was an ordinary file.
    let entry = entry_for(&target, 100);

    // Swapped underneath us before the clean runs.
    fs::remove_file(&target).unwrap();
    symlink("/etc", &target).unwrap();

    let engine = CleanupEngine::new(&home);
    let outcome = engine.clean_entries(&[entry], false);

    assert_eq!(outcome.status, CleanStatus::Failure);
    assert_eq!(outcome.freed_bytes, 0);
    assert_eq!(outcome.errors.len(), 1);
    // The symlink itself is left alone.
    assert!(fs::symlink_metadata(&target).is_ok());
}

#[test]
fn category_clean_honors_entry_selection() {
    let (_dir, home) = temp_home();
    write_file(&home.join("a.bin"), 100);
    write_file(&home.join("b.bin"), 200);

    let mut category = Category::new(CategoryId::SystemCaches);
    category.entries = vec![
        entry_for(&home.join("a.bin"), 100),
        entry_for(&home.join("b.bin"), 200),
    ];
    let keep = category.entries[1].path.clone();
    let first = category.entries[0].id;
    category.toggle_entry(first);

    let engine = CleanupEngine::new(&home);
    let outcome = engine.clean_category(&category, false);

    assert_eq!(outcome.status, CleanStatus::Success);
    assert_eq!(outcome.freed_bytes, 100);
    assert!(!home.join("a.bin").exists());
    assert!(keep.exists());
}

#[test]
fn batch_clean_skips_deselected_categories() {
    let (_dir, home) = temp_home();
    write_file(&home.join("caches/a.bin"), 100);
    write_file(&home.join("logs/b.log"), 200);

    let mut caches = Category::new(CategoryId::SystemCaches);
    caches.entries = vec![entry_for(&home.join("caches/a.bin"), 100)];
    let mut logs = Category::new(CategoryId::ApplicationLogs);
    logs.entries = vec![entry_for(&home.join("logs/b.log"), 200)];
    logs.is_selected = false;

    let engine = CleanupEngine::new(&home);
    let outcome = engine.clean_categories(&[caches, logs], false);

    assert!(outcome.is_success());
    assert_eq!(outcome.freed_bytes, 100);
    assert!(!home.join("caches/a.bin").exists());
    assert!(home.join("logs/b.log").exists());
}

#[test]
fn empty_trash_removes_every_item() {
    let (_dir, home) = temp_home();
    write_file(&home.join(".Trash/doc.pdf"), 500);
    write_file(&home.join(".Trash/folder/inner.txt"), 250);

    let engine = CleanupEngine::new(&home);
    let outcome = engine.empty_trash();

    assert_eq!(outcome.status, CleanStatus::Success);
    assert_eq!(outcome.freed_bytes, 750);
    // The trash directory itself survives, empty.
    assert!(home.join(".Trash").exists());
    assert_eq!(fs::read_dir(home.join(".Trash")).unwrap().count(), 0);
}

#[test]
fn empty_trash_on_missing_directory_is_a_no_op() {
    let (_dir, home) = temp_home();
    let engine = CleanupEngine::new(&home);
    let outcome = engine.empty_trash();
    assert_eq!(outcome.status, CleanStatus::Success);
    assert_eq!(outcome.freed_bytes, 0);
}

#[cfg(unix)]
#[test]
fn empty_trash_skips_dangerous_symlinks() {
    use std::os::unix::fs::symlink;

    let (_dir, home) = temp_home();
    write_file(&home.join(".Trash/doc.pdf"), 500);
    symlink("/etc", home.join(".Trash/escape")).unwrap();

    let engine = CleanupEngine::new(&home);
    let outcome = engine.empty_trash();

    assert_eq!(outcome.status, CleanStatus::Partial);
    assert_eq!(outcome.freed_bytes, 500);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("escape"));
    assert!(fs::symlink_metadata(home.join(".Trash/escape")).is_ok());
}

#[test]
fn background_clean_reports_the_outcome() {
    let (_dir, home) = temp_home();
    write_file(&home.join("a.bin"), 100);

    let engine = CleanupEngine::new(&home);
    let task = worker::spawn_clean(engine, vec![entry_for(&home.join("a.bin"), 100)], false);
    let outcome = task.join().unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.freed_bytes, 100);
    assert!(!home.join("a.bin").exists());
}
