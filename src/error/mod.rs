//! # Error Module
//!
//! Error types for the photo organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, what went wrong, the underlying cause
//! - **Recoverable by default** - most errors demote to a skipped file;
//!   only configuration problems and cache persistence abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Relocation error: {0}")]
    Relocate(#[from] RelocateError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering candidate files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
}

/// Errors that occur while comparing two files
///
/// Callers must treat a pair that produced a comparison error as *not equal*
/// rather than crash, and report the condition.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to read {path} during comparison: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while relocating a file
#[derive(Error, Debug)]
pub enum RelocateError {
    #[error("Failed to create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to transfer {src} to {dst}: {source}")]
    Transfer {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy of {src} to {dst} was incomplete: expected {expected} bytes, wrote {actual}; source kept")]
    ShortCopy {
        src: PathBuf,
        dst: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while persisting the completion cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to serialize completion cache: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to persist completion cache at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_error_includes_path() {
        let error = CompareError::Read {
            path: PathBuf::from("/photos/vacation/img.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation/img.jpg"));
    }

    #[test]
    fn short_copy_error_reports_both_sizes() {
        let error = RelocateError::ShortCopy {
            src: PathBuf::from("/a.jpg"),
            dst: PathBuf::from("/b.jpg"),
            expected: 100,
            actual: 42,
        };
        let message = error.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("42"));
        assert!(message.contains("source kept"));
    }

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/missing"),
        };
        assert!(error.to_string().contains("/photos/missing"));
    }
}
