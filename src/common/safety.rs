use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// System roots that must never be touched, even when reached through a
/// symlink. The list is explicit and enumerable, not heuristic.
const DENIED_ROOTS: &[&str] = &[
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/private/var",
    "/etc",
    "/opt",
    "/Applications",
    "/cores",
    "/Library/Apple",
    "/Library/SystemMigration",
];

/// Substring markers for boot, recovery, and raw-device volumes.
const DENIED_PATTERNS: &[&str] = &["/System/", "/.vol/", "/Volumes/Recovery", "com.apple.boot"];

/// Paths deeper than this are assumed to come from a symlink loop or a
/// pathological traversal chain.
const MAX_PATH_DEPTH: usize = 15;

/// Decides whether a filesystem path is safe for the engine to touch.
///
/// All decisions are made on the canonical form of the path (symlinks
/// followed, `.` and `..` normalized). Verdicts are computed fresh on every
/// call; callers must never cache a "safe" answer across time, because the
/// filesystem can change between scan and delete.
#[derive(Debug, Clone)]
pub struct PathValidator {
    home: PathBuf,
}

impl PathValidator {
    /// Validator scoped to the given home directory. The engine never
    /// operates outside the invoking user's own file tree.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let home = home.canonicalize().unwrap_or(home);
        Self { home }
    }

    /// Validator for the current user's home directory.
    pub fn for_current_user() -> Self {
        Self::new(dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns true only if the path, after resolution, is contained within
    /// the user's home directory and hits no denylisted root, pattern, or
    /// depth limit.
    pub fn is_safe(&self, path: &Path) -> bool {
        let resolved = resolve(path);

        for root in DENIED_ROOTS {
            if resolved.starts_with(root) {
                debug!(path = %resolved.display(), root, "rejected: denylisted root");
                return false;
            }
        }

        let resolved_str = resolved.to_string_lossy();
        for pattern in DENIED_PATTERNS {
            if resolved_str.contains(pattern) {
                debug!(path = %resolved.display(), pattern, "rejected: denylisted pattern");
                return false;
            }
        }

        let depth = resolved
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        if depth > MAX_PATH_DEPTH {
            debug!(path = %resolved.display(), depth, "rejected: exceeds depth limit");
            return false;
        }

        // The single allow-rule: everything the engine touches lives under
        // the user's home directory.
        resolved.starts_with(&self.home)
    }

    /// Guards against a symlink inside an allowed directory pointing outside
    /// it. If the path's immediate entry is a symlink, its resolved target
    /// must pass `is_safe`; non-symlinks always pass.
    pub fn is_not_dangerous_symlink(&self, path: &Path) -> bool {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => self.is_safe(path),
            _ => true,
        }
    }
}

/// Resolves a path to its canonical form. `..` and `.` are normalized
/// lexically first, then the deepest existing ancestor is canonicalized and
/// the vanished remainder re-appended, so verdicts hold for paths that no
/// longer exist on disk.
fn resolve(path: &Path) -> PathBuf {
    let normalized = normalize(path);
    if let Ok(canonical) = normalized.canonicalize() {
        return canonical;
    }

    let mut base = normalized.clone();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    loop {
        if let Ok(canonical) = base.canonicalize() {
            base = canonical;
            break;
        }
        match (base.parent(), base.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                base = parent.to_path_buf();
            }
            _ => return normalized,
        }
    }
    for name in tail.into_iter().rev() {
        base.push(name);
    }
    base
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn validator_in(dir: &tempfile::TempDir) -> PathValidator {
        PathValidator::new(dir.path())
    }

    #[test]
    fn denylisted_roots_rejected() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        for path in ["/System", "/usr/local/lib", "/bin/ls", "/var/log", "/Applications/Foo.app"] {
            assert!(!v.is_safe(Path::new(path)), "{path} should be unsafe");
        }
    }

    #[test]
    fn paths_outside_home_rejected() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let v = validator_in(&dir);
        assert!(!v.is_safe(other.path()));
        assert!(!v.is_safe(Path::new("/")));
    }

    #[test]
    fn paths_inside_home_accepted() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        let inner = dir.path().join("Library/Caches/com.example");
        fs::create_dir_all(&inner).unwrap();
        assert!(v.is_safe(&inner));
        // Also safe when the path does not exist yet.
        assert!(v.is_safe(&dir.path().join("Library/Caches/vanished")));
    }

    #[test]
    fn traversal_segments_are_normalized() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        // Looks benign but escapes home once .. is resolved.
        let sneaky = dir.path().join("Library/../../../../etc/passwd");
        assert!(!v.is_safe(&sneaky));
    }

    #[test]
    fn excessive_depth_rejected() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        let mut deep = dir.path().to_path_buf();
        for i in 0..20 {
            deep.push(format!("level{i}"));
        }
        assert!(!v.is_safe(&deep));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_home_is_dangerous() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        let link = dir.path().join("escape");
        std::os::unix::fs::symlink("/etc", &link).unwrap();
        assert!(!v.is_not_dangerous_symlink(&link));
        // The literal path sits under home, but resolution escapes it.
        assert!(!v.is_safe(&link));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_within_home_is_fine() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        let target = dir.path().join("real");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("alias");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        assert!(v.is_not_dangerous_symlink(&link));
    }

    #[test]
    fn regular_files_pass_the_symlink_check() {
        let dir = tempdir().unwrap();
        let v = validator_in(&dir);
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        assert!(v.is_not_dangerous_symlink(&file));
        // Nonexistent paths also pass: there is no entry to resolve.
        assert!(v.is_not_dangerous_symlink(&dir.path().join("missing")));
    }
}
