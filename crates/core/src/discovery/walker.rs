//! Recursive file enumeration.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::types::FileTask;
use crate::metrics;

/// Recursively collects every non-directory entry under `root`.
///
/// A missing root yields an empty list. Entries that fail to read are
/// logged and skipped, along with anything below them.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        debug!(root = %root.display(), "Discovery root does not exist");
        return Vec::new();
    }

    let files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    path = ?e.path(),
                    error = %e,
                    "Skipping unreadable entry during discovery"
                );
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();

    metrics::FILES_DISCOVERED.inc_by(files.len() as u64);
    debug!(root = %root.display(), files = files.len(), "Discovery finished");
    files
}

/// Discovers files under `root` and keeps only recognized media types.
pub fn discover_tasks(root: &Path) -> Vec<FileTask> {
    discover(root)
        .into_iter()
        .filter_map(FileTask::from_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_discover_missing_root_is_empty() {
        let files = discover(Path::new("/nonexistent/reencode/root"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(discover(dir.path()).is_empty());
    }

    #[test]
    fn test_discover_all_depths() {
        let dir = TempDir::new().unwrap();
        let expected: HashSet<PathBuf> = [
            "top.mp3",
            "one/a.flac",
            "one/two/b.txt",
            "one/two/three/four/c.mp3",
        ]
        .iter()
        .map(|p| dir.path().join(p))
        .collect();
        for path in &expected {
            touch(path);
        }
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let found: HashSet<PathBuf> = discover(dir.path()).into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_discover_single_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.mp3");
        touch(&file);

        assert_eq!(discover(&file), vec![file]);
    }

    #[test]
    fn test_discover_tasks_filters_types() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.mp3"));
        touch(&dir.path().join("b.flac"));
        touch(&dir.path().join("c.txt"));
        touch(&dir.path().join("sub/d.mp3"));

        let tasks: HashSet<PathBuf> = discover_tasks(dir.path())
            .into_iter()
            .map(|t| t.path().to_path_buf())
            .collect();

        assert_eq!(tasks.len(), 3);
        assert!(tasks.contains(&dir.path().join("a.mp3")));
        assert!(tasks.contains(&dir.path().join("b.flac")));
        assert!(tasks.contains(&dir.path().join("sub/d.mp3")));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_unreadable_subtree() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("ok.mp3"));
        let locked = dir.path().join("locked");
        touch(&locked.join("hidden.mp3"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root bypasses permission bits, so only check the negative case when enforced.
        let enforced = fs::read_dir(&locked).is_err();
        let found = discover(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(found.contains(&dir.path().join("ok.mp3")));
        if enforced {
            assert!(!found.contains(&locked.join("hidden.mp3")));
        }
    }
}
