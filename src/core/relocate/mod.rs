//! # Relocation Engine
//!
//! Moves or copies one file into place without ever silently losing data.
//!
//! A rename is preferred; the first rename failure (typically a cross-device
//! move) permanently downgrades the rest of the run to copy+delete. An
//! occupied destination is either recognized as a duplicate, refused, or
//! disambiguated with a `(1)`, `(2)`, ... counter before the extension. In
//! copy mode the source is never deleted, whatever branch is taken.

use crate::core::compare::{CompareDepth, Comparator};
use crate::core::config::MoveOptions;
use crate::core::fsops::FsOps;
use crate::error::RelocateError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the engine decided for one source/destination pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocateOutcome {
    /// File was transferred, possibly to a disambiguated name
    Relocated { dst: PathBuf },
    /// Destination already held the same content; the source was removed
    DuplicateRemoved { dst: PathBuf },
    /// Destination already held the same content; both copies were kept
    DuplicateKept { dst: PathBuf },
    /// Destination exists with different content and overwriting is disabled
    Refused { dst: PathBuf },
}

/// Collision-safe move/copy engine
pub struct Relocator {
    comparator: Comparator,
    fsops: FsOps,
    copy: bool,
    remove_duplicates: bool,
    no_overwrite: bool,
    // Cleared after the first failed rename; the rest of the run copies.
    use_rename: bool,
}

impl Relocator {
    pub fn new(options: &MoveOptions) -> Self {
        Self {
            comparator: Comparator::new(options.depth),
            fsops: FsOps::new(options.pretend),
            copy: options.copy,
            remove_duplicates: options.remove_duplicates,
            no_overwrite: options.no_overwrite,
            use_rename: true,
        }
    }

    /// Relocate `src` to `dst_candidate` or a disambiguated sibling.
    pub fn relocate(
        &mut self,
        src: &Path,
        dst_candidate: &Path,
    ) -> Result<RelocateOutcome, RelocateError> {
        let mut dst = dst_candidate.to_path_buf();

        if dst.exists() {
            match self.duplicate_of_existing(src, &dst) {
                Ok(true) => {
                    // Copy mode never deletes the source, duplicate or not
                    return if self.remove_duplicates && !self.copy {
                        self.fsops
                            .remove_file(src)
                            .map_err(|source| RelocateError::Remove {
                                path: src.to_path_buf(),
                                source,
                            })?;
                        Ok(RelocateOutcome::DuplicateRemoved { dst })
                    } else {
                        Ok(RelocateOutcome::DuplicateKept { dst })
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    // Unreadable during comparison: treat the pair as not
                    // equal and keep going.
                    warn!("comparison against existing destination failed: {e}");
                }
            }

            if self.no_overwrite {
                return Ok(RelocateOutcome::Refused { dst });
            }

            dst = disambiguate(&dst);
        }

        if let Some(parent) = dst.parent() {
            self.fsops
                .create_dir_all(parent)
                .map_err(|source| RelocateError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        self.transfer(src, &dst)?;
        Ok(RelocateOutcome::Relocated { dst })
    }

    /// Duplicate check against an occupied destination: size equality plus,
    /// in deep mode, a byte compare; in shallow mode, mtime equality.
    fn duplicate_of_existing(
        &self,
        src: &Path,
        dst: &Path,
    ) -> Result<bool, crate::error::CompareError> {
        if !self.comparator.sizes_equal(src, dst)? {
            return Ok(false);
        }
        match self.comparator.depth() {
            CompareDepth::Shallow => self.comparator.mtimes_equal(src, dst),
            CompareDepth::Deep => self.comparator.bytes_equal(src, dst),
        }
    }

    fn transfer(&mut self, src: &Path, dst: &Path) -> Result<(), RelocateError> {
        if self.use_rename && !self.copy {
            match self.fsops.rename(src, dst) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!(
                        "rename of {} failed ({e}); copying for the rest of the run",
                        src.display()
                    );
                    self.use_rename = false;
                }
            }
        }

        let transfer_error = |source| RelocateError::Transfer {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        };

        let src_size = fs::metadata(src).map_err(transfer_error)?.len();
        self.fsops.copy(src, dst).map_err(transfer_error)?;

        if !self.fsops.pretend() {
            // Verify the copy landed whole before touching the source
            let dst_size = fs::metadata(dst).map_err(transfer_error)?.len();
            if dst_size != src_size {
                let _ = fs::remove_file(dst);
                return Err(RelocateError::ShortCopy {
                    src: src.to_path_buf(),
                    dst: dst.to_path_buf(),
                    expected: src_size,
                    actual: dst_size,
                });
            }
        }

        if !self.copy {
            self.fsops
                .remove_file(src)
                .map_err(|source| RelocateError::Remove {
                    path: src.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Find an unused sibling name by inserting `(1)`, `(2)`, ... immediately
/// before the extension.
fn disambiguate(dst: &Path) -> PathBuf {
    let stem = dst
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = dst.extension().and_then(|e| e.to_str());
    let parent = dst.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem}({counter}).{ext}"),
            None => format!("{stem}({counter})"),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
