//! Resolved run configuration.
//!
//! Produced by the CLI layer and passed immutably into every component, so
//! no engine depends on ambient state and each is testable on its own.

use crate::core::compare::CompareDepth;
use std::path::PathBuf;

/// Which members of a duplicate group survive resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepPolicy {
    /// Keep the file(s) with the latest modification time
    Newest,
    /// Keep the file(s) with the earliest modification time
    Oldest,
    /// Keep the file(s) with the fewest path segments
    Shortest,
    /// Keep the file(s) with the most path segments
    Longest,
}

/// Configuration for the move pipeline
#[derive(Debug, Clone)]
pub struct MoveOptions {
    /// Root of the tree to organize (absolute)
    pub source: PathBuf,
    /// Root of the destination archive (absolute)
    pub target: PathBuf,
    /// Recurse into subfolders of the source
    pub recurse: bool,
    /// Delete the source file when the destination already holds the same content
    pub remove_duplicates: bool,
    /// How thoroughly files are compared for equality
    pub depth: CompareDepth,
    /// Load and persist the completion cache
    pub use_cache: bool,
    /// Refuse to relocate when the destination name is taken by different content
    pub no_overwrite: bool,
    /// Copy files into place instead of moving them
    pub copy: bool,
    /// Compute and report decisions without touching the filesystem
    pub pretend: bool,
    /// Also report files that need no action
    pub verbose: bool,
}

/// Configuration for the clean pipeline
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Root of the tree holding suspected duplicates (absolute)
    pub source: PathBuf,
    /// Archive root to check against; `None` cleans within the source tree
    pub target: Option<PathBuf>,
    /// Recurse into subfolders of the source
    pub recurse: bool,
    /// How thoroughly files are compared for equality
    pub depth: CompareDepth,
    /// Policy selecting which group members survive; `None` keeps dated paths
    pub keep: Option<KeepPolicy>,
    /// Break remaining ties by keeping the lexicographically first path
    pub force: bool,
    /// Compute and report decisions without touching the filesystem
    pub pretend: bool,
    /// Also report files that need no action
    pub verbose: bool,
}
