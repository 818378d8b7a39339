//! Duplicate resolution policy.
//!
//! Given one content-equal group, selects which members to delete. Every
//! policy keeps ties at the extreme; only the opt-in force pass is allowed
//! to break ties arbitrarily.

use crate::core::config::KeepPolicy;
use crate::core::dates::date_from_path;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// Members of `group` the active policy wants deleted.
///
/// Never selects the whole group: ambiguity blocks deletion.
pub fn select_deletions(group: &[PathBuf], keep: Option<KeepPolicy>) -> Vec<PathBuf> {
    match keep {
        Some(KeepPolicy::Newest) => keep_extreme_mtime(group, true),
        Some(KeepPolicy::Oldest) => keep_extreme_mtime(group, false),
        Some(KeepPolicy::Shortest) => keep_extreme_depth(group, false),
        Some(KeepPolicy::Longest) => keep_extreme_depth(group, true),
        None => without_dated_path(group),
    }
}

/// Force pass: keep only the lexicographically-first path, delete the rest.
pub fn force_deletions(survivors: &[PathBuf]) -> Vec<PathBuf> {
    if survivors.len() < 2 {
        return Vec::new();
    }
    let mut sorted = survivors.to_vec();
    sorted.sort();
    sorted.split_off(1)
}

/// Keep every member sharing the extreme modification time, delete the rest.
/// An unreadable mtime keeps the whole group.
fn keep_extreme_mtime(group: &[PathBuf], newest: bool) -> Vec<PathBuf> {
    let mut keyed: Vec<(PathBuf, SystemTime)> = Vec::with_capacity(group.len());
    for path in group {
        match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => keyed.push((path.clone(), mtime)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "cannot read modification time ({e}); keeping the whole group"
                );
                return Vec::new();
            }
        }
    }

    let extreme = if newest {
        keyed.iter().map(|(_, t)| *t).max()
    } else {
        keyed.iter().map(|(_, t)| *t).min()
    };
    let Some(extreme) = extreme else {
        return Vec::new();
    };

    keyed
        .into_iter()
        .filter(|(_, mtime)| *mtime != extreme)
        .map(|(path, _)| path)
        .collect()
}

/// Keep every member with the extreme path segment count, delete the rest.
fn keep_extreme_depth(group: &[PathBuf], longest: bool) -> Vec<PathBuf> {
    let depth = |path: &Path| path.components().count();

    let extreme = if longest {
        group.iter().map(|p| depth(p)).max()
    } else {
        group.iter().map(|p| depth(p)).min()
    };
    let Some(extreme) = extreme else {
        return Vec::new();
    };

    group
        .iter()
        .filter(|path| depth(path) != extreme)
        .cloned()
        .collect()
}

/// Default policy: prefer keeping files whose path already encodes a date.
///
/// Three passes over the same group, each independent of the previous one:
/// members lacking a year, else members lacking a month, else members
/// lacking a day. Whichever pass first selects anything wins, unless it
/// selected everyone - then nothing is deleted.
fn without_dated_path(group: &[PathBuf]) -> Vec<PathBuf> {
    let missing = |lacks: fn(i32, u32, u32) -> bool| -> Vec<PathBuf> {
        group
            .iter()
            .filter(|path| {
                let (date, _) = date_from_path(path);
                lacks(date.year, date.month, date.day)
            })
            .cloned()
            .collect()
    };

    let mut selected = missing(|year, _, _| year == 0);
    if selected.is_empty() {
        selected = missing(|_, month, _| month == 0);
    }
    if selected.is_empty() {
        selected = missing(|_, _, day| day == 0);
    }

    if selected.len() == group.len() {
        return Vec::new();
    }
    selected
}
