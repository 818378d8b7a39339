//! # Scanner Module
//!
//! Discovers candidate files for the move and clean pipelines.
//!
//! Hidden entries (dotfiles, which also covers the completion cache file)
//! and Synology `@eaDir` service folders are skipped. Results are sorted by
//! file name so repeat runs see candidates in the same order.

use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Directories never scanned
const SKIP_DIRS: &[&str] = &["@eaDir"];

fn keep_entry(entry: &DirEntry, root: &Path) -> bool {
    if entry.path() == root {
        return true;
    }
    match entry.file_name().to_str() {
        Some(name) => !name.starts_with('.') && !SKIP_DIRS.contains(&name),
        None => true,
    }
}

/// Collect all candidate files under `root`.
///
/// Unreadable entries below the root are reported and skipped; only a
/// missing root is an error.
pub fn collect_candidates(root: &Path, recurse: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recurse {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| keep_entry(e, root)) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(%path, "skipping unreadable entry: {e}");
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn finds_files_recursively() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.jpg"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/b.jpg"));

        let files = collect_candidates(dir.path(), true).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn no_recurse_stays_at_the_top_level() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.jpg"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/b.jpg"));

        let files = collect_candidates(dir.path(), false).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.jpg"));
    }

    #[test]
    fn skips_hidden_files_and_service_dirs() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("visible.jpg"));
        touch(&dir.path().join(".photo-organizer.cache"));
        fs::create_dir(dir.path().join("@eaDir")).unwrap();
        touch(&dir.path().join("@eaDir/thumb.jpg"));
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        touch(&dir.path().join(".hidden/secret.jpg"));

        let files = collect_candidates(dir.path(), true).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.jpg"));
    }

    #[test]
    fn results_are_sorted() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("c.jpg"));

        let files = collect_candidates(dir.path(), true).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = collect_candidates(Path::new("/nonexistent/path/12345"), true);
        assert!(result.is_err());
    }
}
