//! # Duplicate Grouping Engine
//!
//! Partitions candidate files into exact-content clusters and deletes the
//! members the resolution policy selects.
//!
//! Two operating modes:
//! - **Cross-tree**: each source file is checked against a pre-hashed set of
//!   same-sized files in the target tree; a match deletes the source.
//! - **Within-tree**: files are bucketed by size, then hash, then greedily
//!   partitioned into content-equal groups; the keep policy decides which
//!   members of each group to delete.
//!
//! The whole delete set for a group is computed before any deletion is
//! issued, so an interrupted run never leaves a group half-resolved.

pub mod policy;

use crate::core::compare::{self, Comparator};
use crate::core::config::CleanOptions;
use crate::core::fsops::FsOps;
use crate::core::scanner::collect_candidates;
use crate::error::OrganizerError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One decision made by the clean pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanEvent {
    /// A source file matched a file in the target tree and was deleted
    DuplicateOfTarget {
        path: PathBuf,
        duplicate_of: PathBuf,
    },
    /// A content-equal group of two or more files was found within the tree
    GroupFound { members: Vec<PathBuf> },
    /// Group members selected for deletion were removed
    Deleted { paths: Vec<PathBuf>, forced: bool },
    /// No unambiguous choice could be made; every member was kept
    KeptAll { members: Vec<PathBuf> },
}

/// Counters for one clean run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Source-side files examined
    pub candidates: usize,
    /// Content-equal groups found (within-tree mode)
    pub groups: usize,
    /// Files deleted
    pub deleted: usize,
    /// Bytes the deletions reclaimed
    pub bytes_reclaimed: u64,
}

/// Size bucket: every candidate appears exactly once, keyed by its own size
type SizeBuckets = BTreeMap<u64, Vec<PathBuf>>;

fn size_buckets(paths: Vec<PathBuf>) -> SizeBuckets {
    let mut buckets = SizeBuckets::new();
    for path in paths {
        match compare::file_size(&path) {
            Ok(size) => buckets.entry(size).or_default().push(path),
            Err(e) => warn!("skipping candidate: {e}"),
        }
    }
    buckets
}

/// The clean pipeline driver
pub struct CleanEngine<'a> {
    options: &'a CleanOptions,
    comparator: Comparator,
    fsops: FsOps,
}

impl<'a> CleanEngine<'a> {
    pub fn new(options: &'a CleanOptions) -> Self {
        Self {
            options,
            comparator: Comparator::new(options.depth),
            fsops: FsOps::new(options.pretend),
        }
    }

    /// Run the pipeline, reporting every decision through `observe`.
    pub fn run<F>(&self, mut observe: F) -> Result<CleanSummary, OrganizerError>
    where
        F: FnMut(CleanEvent),
    {
        let sources = collect_candidates(&self.options.source, self.options.recurse)?;
        let mut summary = CleanSummary {
            candidates: sources.len(),
            ..CleanSummary::default()
        };
        let buckets = size_buckets(sources);

        match &self.options.target {
            Some(target) => {
                self.clean_against_target(target, &buckets, &mut summary, &mut observe)?
            }
            None => self.clean_within(buckets, &mut summary, &mut observe),
        }
        Ok(summary)
    }

    /// Cross-tree mode: delete source files that already exist in the
    /// target tree.
    fn clean_against_target<F>(
        &self,
        target: &Path,
        source_buckets: &SizeBuckets,
        summary: &mut CleanSummary,
        observe: &mut F,
    ) -> Result<(), OrganizerError>
    where
        F: FnMut(CleanEvent),
    {
        // The archive side is always walked in full
        let mut target_buckets = SizeBuckets::new();
        for path in collect_candidates(target, true)? {
            // Never treat a source file as a duplicate of itself
            if path.starts_with(&self.options.source) {
                continue;
            }
            let size = match compare::file_size(&path) {
                Ok(size) => size,
                Err(e) => {
                    warn!("skipping target candidate: {e}");
                    continue;
                }
            };
            // Only sizes present on the source side can ever match
            if !source_buckets.contains_key(&size) {
                continue;
            }
            target_buckets.entry(size).or_default().push(path);
        }

        for (size, sources) in source_buckets {
            let Some(candidates) = target_buckets.get(size) else {
                continue;
            };

            // Hash the target side once per size
            let mut hashed: Vec<(&PathBuf, u64)> = Vec::with_capacity(candidates.len());
            for path in candidates {
                match compare::hash_file(path) {
                    Ok(hash) => hashed.push((path, hash)),
                    Err(e) => warn!("skipping unhashable target file: {e}"),
                }
            }

            'next_source: for src in sources {
                let hash = match compare::hash_file(src) {
                    Ok(hash) => hash,
                    Err(e) => {
                        warn!("skipping unhashable source file: {e}");
                        continue;
                    }
                };

                for (candidate, candidate_hash) in &hashed {
                    if hash != *candidate_hash {
                        continue;
                    }
                    // Hash equality triggers a byte confirmation only in
                    // deep mode; shallow trusts the hash.
                    match self.comparator.confirm_hash_match(src, candidate) {
                        Ok(true) => {
                            if let Err(e) = self.fsops.remove_file(src) {
                                warn!("failed to delete duplicate {}: {e}", src.display());
                                continue 'next_source;
                            }
                            summary.deleted += 1;
                            summary.bytes_reclaimed += size;
                            observe(CleanEvent::DuplicateOfTarget {
                                path: src.clone(),
                                duplicate_of: (*candidate).clone(),
                            });
                            continue 'next_source;
                        }
                        Ok(false) => {} // hash collision without equality
                        Err(e) => warn!("confirmation failed, treating as not equal: {e}"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Within-tree mode: group content-equal files and apply the keep
    /// policy to each group.
    fn clean_within<F>(&self, buckets: SizeBuckets, summary: &mut CleanSummary, observe: &mut F)
    where
        F: FnMut(CleanEvent),
    {
        for (size, files) in buckets {
            if files.len() < 2 {
                continue;
            }

            // Bucket the size class by hash
            let mut by_hash: BTreeMap<u64, Vec<PathBuf>> = BTreeMap::new();
            for path in files {
                match compare::hash_file(&path) {
                    Ok(hash) => by_hash.entry(hash).or_default().push(path),
                    Err(e) => warn!("skipping unhashable file: {e}"),
                }
            }

            for (_, mut remaining) in by_hash {
                if remaining.len() < 2 {
                    continue;
                }

                // Greedy partition: pull everything equal to the pivot into
                // one group, then repeat with the leftovers. Hash collisions
                // without content equality split into separate groups.
                while remaining.len() > 1 {
                    let pivot = remaining.remove(0);
                    let mut group = vec![pivot];
                    let mut i = 0;
                    while i < remaining.len() {
                        match self.comparator.confirm_hash_match(&group[0], &remaining[i]) {
                            Ok(true) => group.push(remaining.remove(i)),
                            Ok(false) => i += 1,
                            Err(e) => {
                                warn!("comparison failed, treating as not equal: {e}");
                                i += 1;
                            }
                        }
                    }

                    if group.len() < 2 {
                        continue;
                    }
                    summary.groups += 1;
                    observe(CleanEvent::GroupFound {
                        members: group.clone(),
                    });
                    self.resolve_group(group, size, summary, observe);
                }
            }
        }
    }

    fn resolve_group<F>(
        &self,
        group: Vec<PathBuf>,
        size: u64,
        summary: &mut CleanSummary,
        observe: &mut F,
    ) where
        F: FnMut(CleanEvent),
    {
        let to_delete = policy::select_deletions(&group, self.options.keep);
        let removed = self.delete_all(&to_delete, size, summary);
        if !removed.is_empty() {
            observe(CleanEvent::Deleted {
                paths: removed,
                forced: false,
            });
        }

        let survivors: Vec<PathBuf> = group
            .iter()
            .filter(|path| !to_delete.contains(*path))
            .cloned()
            .collect();

        if survivors.len() > 1 && self.options.force {
            // Second pass, lexical ordering only
            let forced = policy::force_deletions(&survivors);
            let removed = self.delete_all(&forced, size, summary);
            if !removed.is_empty() {
                observe(CleanEvent::Deleted {
                    paths: removed,
                    forced: true,
                });
            }
        } else if to_delete.is_empty() {
            observe(CleanEvent::KeptAll { members: survivors });
        }
    }

    fn delete_all(
        &self,
        paths: &[PathBuf],
        size: u64,
        summary: &mut CleanSummary,
    ) -> Vec<PathBuf> {
        let mut removed = Vec::with_capacity(paths.len());
        for path in paths {
            match self.fsops.remove_file(path) {
                Ok(()) => {
                    summary.deleted += 1;
                    summary.bytes_reclaimed += size;
                    removed.push(path.clone());
                }
                Err(e) => warn!("failed to delete {}: {e}", path.display()),
            }
        }
        removed
    }
}
