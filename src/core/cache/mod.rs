//! # Completion Cache
//!
//! Persisted set of paths already verified placed or moved, so repeat runs
//! of the move pipeline skip redundant work.
//!
//! The cache is a JSON-serialized set of absolute path strings stored at a
//! fixed location under the target directory. An absent file is an empty
//! set; a corrupt or unreadable file is treated as empty rather than fatal.
//! Saving writes a sibling temp file and atomically renames it over the old
//! cache, so a crash mid-save never corrupts the previous state.

use crate::error::CacheError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the cache blob, relative to the target directory
pub const CACHE_FILE_NAME: &str = ".photo-organizer.cache";

/// Set of paths known to be already correctly placed or already moved
#[derive(Debug)]
pub struct CompletionCache {
    path: PathBuf,
    done: HashSet<PathBuf>,
    enabled: bool,
}

impl CompletionCache {
    /// Load the cache stored under `target`.
    ///
    /// When `enabled` is false nothing is loaded and nothing will be saved;
    /// the cache then behaves as an always-empty set.
    pub fn load(target: &Path, enabled: bool) -> Self {
        let path = target.join(CACHE_FILE_NAME);
        let mut done = HashSet::new();

        if enabled {
            match fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice::<HashSet<PathBuf>>(&bytes) {
                    Ok(set) => {
                        debug!(entries = set.len(), "loaded completion cache");
                        done = set;
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            "corrupt completion cache, starting fresh: {e}"
                        );
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), "unreadable completion cache, starting fresh: {e}");
                }
            }
        }

        Self {
            path,
            done,
            enabled,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.done.contains(path)
    }

    pub fn insert(&mut self, path: &Path) {
        self.done.insert(path.to_path_buf());
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Persist the set atomically. A no-op when caching is disabled; callers
    /// skip this entirely in pretend mode and on failed runs.
    pub fn save(&self) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        let bytes = serde_json::to_vec(&self.done)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Persist {
                path: self.path.clone(),
                source,
            })?;
        }

        let tmp = self.path.with_file_name(format!("{CACHE_FILE_NAME}.tmp"));
        fs::write(&tmp, bytes).map_err(|source| CacheError::Persist {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| CacheError::Persist {
            path: self.path.clone(),
            source,
        })
    }
}
