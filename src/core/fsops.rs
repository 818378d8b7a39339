//! Pretend-aware filesystem mutation primitives.
//!
//! Every mutation the engines perform goes through one of these, so pretend
//! mode disables them all in one place while the decision logic still runs.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct FsOps {
    pretend: bool,
}

impl FsOps {
    pub fn new(pretend: bool) -> Self {
        Self { pretend }
    }

    pub fn pretend(&self) -> bool {
        self.pretend
    }

    pub fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.pretend {
            return Ok(());
        }
        fs::create_dir_all(path)
    }

    pub fn rename(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if self.pretend {
            return Ok(());
        }
        fs::rename(src, dst)
    }

    pub fn copy(&self, src: &Path, dst: &Path) -> io::Result<()> {
        if self.pretend {
            return Ok(());
        }
        fs::copy(src, dst).map(|_| ())
    }

    pub fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.pretend {
            debug!(path = %path.display(), "pretend: would remove");
            return Ok(());
        }
        fs::remove_file(path)
    }
}
