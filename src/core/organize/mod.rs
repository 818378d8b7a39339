//! # Move Driver
//!
//! Walks the source tree and relocates every dateable file into the
//! `<target>/<year>/<month>/<day>/` layout.
//!
//! For each candidate the driver resolves a creation date, compares it to
//! the date encoded in the file's current folder structure, and either marks
//! the file as correctly placed or hands it to the relocation engine. Work
//! recorded in the completion cache is skipped on repeat runs.

use crate::core::cache::CompletionCache;
use crate::core::config::MoveOptions;
use crate::core::dates::{date_from_path, DateResolver, MetadataProvider, ResolvedDate};
use crate::core::metadata::ExifProvider;
use crate::core::relocate::{RelocateOutcome, Relocator};
use crate::core::scanner::collect_candidates;
use crate::error::OrganizerError;
use chrono::Datelike;
use std::path::{Path, PathBuf};

/// The date folder the file was found in, where it disagrees with the
/// resolved creation date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMismatch {
    /// File sits in a year folder that doesn't match
    Year(i32),
    /// Year matches but the month folder doesn't
    Month(u32),
    /// Year and month match but the day folder doesn't
    Day(u32),
    /// The current path encodes no date at all
    NoDateInPath,
}

/// One decision made by the move pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveEvent {
    /// File already sits at its canonical location
    ProperlyPlaced { path: PathBuf, resolved: ResolvedDate },
    /// File was transferred into the date layout
    Relocated {
        src: PathBuf,
        dst: PathBuf,
        resolved: ResolvedDate,
        mismatch: PathMismatch,
    },
    /// The canonical destination already held identical content
    DuplicateAtDestination {
        src: PathBuf,
        dst: PathBuf,
        removed: bool,
    },
    /// The canonical destination is occupied by different content and
    /// overwriting is disabled
    Conflict { src: PathBuf, dst: PathBuf },
    /// No creation date could be resolved; the file was left untouched
    Undateable { path: PathBuf },
    /// The relocation failed; the file was left untouched
    Failed { src: PathBuf, error: String },
}

/// Counters for one move run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSummary {
    pub candidates: usize,
    pub moved: usize,
    pub properly_placed: usize,
    pub duplicates: usize,
    pub conflicts: usize,
    pub undateable: usize,
    pub failures: usize,
    pub skipped_cached: usize,
}

/// The move pipeline driver
pub struct MoveDriver<'a, P: MetadataProvider> {
    options: &'a MoveOptions,
    resolver: DateResolver<P>,
    relocator: Relocator,
    cache: CompletionCache,
}

impl<'a> MoveDriver<'a, ExifProvider> {
    pub fn new(options: &'a MoveOptions) -> Self {
        Self::with_provider(options, ExifProvider)
    }
}

impl<'a, P: MetadataProvider> MoveDriver<'a, P> {
    /// Build a driver with a custom metadata provider (used by tests)
    pub fn with_provider(options: &'a MoveOptions, provider: P) -> Self {
        Self {
            options,
            resolver: DateResolver::new(provider),
            relocator: Relocator::new(options),
            cache: CompletionCache::load(&options.target, options.use_cache),
        }
    }

    /// Run the pipeline, reporting every decision through `observe`.
    ///
    /// The completion cache is persisted only when the run finishes and
    /// pretend mode is off.
    pub fn run<F>(&mut self, mut observe: F) -> Result<MoveSummary, OrganizerError>
    where
        F: FnMut(MoveEvent),
    {
        let candidates = collect_candidates(&self.options.source, self.options.recurse)?;
        let mut summary = MoveSummary {
            candidates: candidates.len(),
            ..MoveSummary::default()
        };

        for path in candidates {
            if self.cache.contains(&path) {
                summary.skipped_cached += 1;
                continue;
            }
            self.process(&path, &mut summary, &mut observe);
        }

        if !self.options.pretend {
            self.cache.save()?;
        }
        Ok(summary)
    }

    fn process<F>(&mut self, path: &Path, summary: &mut MoveSummary, observe: &mut F)
    where
        F: FnMut(MoveEvent),
    {
        let Some(resolved) = self.resolver.resolve(path) else {
            summary.undateable += 1;
            observe(MoveEvent::Undateable {
                path: path.to_path_buf(),
            });
            return;
        };

        let Some(file_name) = path.file_name() else {
            return; // walked candidates always carry a final component
        };
        let dst = canonical_destination(&self.options.target, &resolved, file_name);

        // The path-embedded date is computed independently, purely as a
        // consistency check against the resolved date.
        let (path_date, _) = date_from_path(path);
        let date = resolved.datetime.date();
        let mismatch = if path_date.has_year() {
            if path_date.year != date.year() {
                Some(PathMismatch::Year(path_date.year))
            } else if path_date.month != date.month() {
                Some(PathMismatch::Month(path_date.month))
            } else if path_date.day != date.day() {
                Some(PathMismatch::Day(path_date.day))
            } else {
                None
            }
        } else {
            Some(PathMismatch::NoDateInPath)
        };

        let Some(mismatch) = mismatch else {
            self.cache.insert(path);
            summary.properly_placed += 1;
            observe(MoveEvent::ProperlyPlaced {
                path: path.to_path_buf(),
                resolved,
            });
            return;
        };

        match self.relocator.relocate(path, &dst) {
            Ok(RelocateOutcome::Relocated { dst }) => {
                self.cache.insert(path);
                self.cache.insert(&dst);
                summary.moved += 1;
                observe(MoveEvent::Relocated {
                    src: path.to_path_buf(),
                    dst,
                    resolved,
                    mismatch,
                });
            }
            Ok(RelocateOutcome::DuplicateRemoved { dst }) => {
                self.cache.insert(path);
                self.cache.insert(&dst);
                summary.duplicates += 1;
                observe(MoveEvent::DuplicateAtDestination {
                    src: path.to_path_buf(),
                    dst,
                    removed: true,
                });
            }
            Ok(RelocateOutcome::DuplicateKept { dst }) => {
                self.cache.insert(path);
                self.cache.insert(&dst);
                summary.duplicates += 1;
                observe(MoveEvent::DuplicateAtDestination {
                    src: path.to_path_buf(),
                    dst,
                    removed: false,
                });
            }
            Ok(RelocateOutcome::Refused { dst }) => {
                summary.conflicts += 1;
                observe(MoveEvent::Conflict {
                    src: path.to_path_buf(),
                    dst,
                });
            }
            Err(e) => {
                summary.failures += 1;
                observe(MoveEvent::Failed {
                    src: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// `<target>/<year>/<month>/<day>/<basename>`
fn canonical_destination(
    target: &Path,
    resolved: &ResolvedDate,
    file_name: &std::ffi::OsStr,
) -> PathBuf {
    let date = resolved.datetime.date();
    target
        .join(date.year().to_string())
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compare::CompareDepth;
    use crate::core::dates::OriginalDate;
    use chrono::{NaiveDate, NaiveTime};
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Provider that never finds metadata, forcing name-based resolution
    struct NoMetadata;

    impl MetadataProvider for NoMetadata {
        fn original_date(&self, _path: &Path) -> Option<OriginalDate> {
            None
        }
    }

    /// Provider with one fixed answer for every file
    struct Fixed(chrono::NaiveDateTime);

    impl MetadataProvider for Fixed {
        fn original_date(&self, _path: &Path) -> Option<OriginalDate> {
            Some(OriginalDate {
                datetime: self.0,
                has_subsec: false,
            })
        }
    }

    fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content).unwrap();
    }

    fn options(source: PathBuf, target: PathBuf) -> MoveOptions {
        MoveOptions {
            source,
            target,
            recurse: true,
            remove_duplicates: true,
            depth: CompareDepth::Deep,
            use_cache: true,
            no_overwrite: false,
            copy: false,
            pretend: false,
            verbose: false,
        }
    }

    #[test]
    fn moves_name_dated_file_to_canonical_path() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let target = dir.path().join("archive");
        write_file(&source.join("vacation-2019-07-04.jpg"), b"pixels");
        fs::create_dir_all(&target).unwrap();

        let opts = options(source.clone(), target.clone());
        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        let summary = driver.run(|_| {}).unwrap();

        assert_eq!(summary.moved, 1);
        assert!(target
            .join("2019/07/04/vacation-2019-07-04.jpg")
            .exists());
        assert!(!source.join("vacation-2019-07-04.jpg").exists());
    }

    #[test]
    fn moved_file_is_properly_placed_on_the_next_run() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("photos");
        write_file(&root.join("vacation-2019-07-04.jpg"), b"pixels");

        // Source and target are the same tree, so the relocated file is a
        // candidate again on the second run.
        let opts = MoveOptions {
            use_cache: false,
            ..options(root.clone(), root.clone())
        };

        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        driver.run(|_| {}).unwrap();
        let moved = root.join("2019/07/04/vacation-2019-07-04.jpg");
        assert!(moved.exists());

        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        let mut placed = Vec::new();
        let summary = driver
            .run(|e| {
                if let MoveEvent::ProperlyPlaced { path, .. } = e {
                    placed.push(path);
                }
            })
            .unwrap();

        assert_eq!(summary.moved, 0);
        assert_eq!(summary.properly_placed, 1);
        assert_eq!(placed, vec![moved.clone()]);
        assert!(moved.exists());
    }

    #[test]
    fn metadata_beats_a_misleading_path() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("photos");
        // Sits in a 2020 folder but metadata says 2018-03-09
        write_file(&root.join("2020/05/01/shot.jpg"), b"pixels");

        let taken = NaiveDate::from_ymd_opt(2018, 3, 9)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let opts = options(root.clone(), root.clone());
        let mut driver = MoveDriver::with_provider(&opts, Fixed(taken));

        let mut events = Vec::new();
        let summary = driver.run(|e| events.push(e)).unwrap();

        assert_eq!(summary.moved, 1);
        assert!(root.join("2018/03/09/shot.jpg").exists());
        assert!(matches!(
            events[0],
            MoveEvent::Relocated {
                mismatch: PathMismatch::Year(2020),
                ..
            }
        ));
    }

    #[test]
    fn partial_path_date_still_forces_a_move() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("photos");
        // Year folder matches, but there is no month/day structure
        write_file(&root.join("2018/shot.jpg"), b"pixels");

        let taken = NaiveDate::from_ymd_opt(2018, 3, 9)
            .unwrap()
            .and_time(NaiveTime::MIN);
        let opts = options(root.clone(), root.clone());
        let mut driver = MoveDriver::with_provider(&opts, Fixed(taken));

        let mut events = Vec::new();
        driver.run(|e| events.push(e)).unwrap();

        assert!(root.join("2018/03/09/shot.jpg").exists());
        assert!(matches!(
            events[0],
            MoveEvent::Relocated {
                mismatch: PathMismatch::Month(0),
                ..
            }
        ));
    }

    #[test]
    fn undateable_files_are_left_untouched() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let target = dir.path().join("archive");
        write_file(&source.join("holiday.jpg"), b"pixels");
        fs::create_dir_all(&target).unwrap();

        let opts = options(source.clone(), target);
        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);

        let mut events = Vec::new();
        let summary = driver.run(|e| events.push(e)).unwrap();

        assert_eq!(summary.undateable, 1);
        assert_eq!(summary.moved, 0);
        assert!(source.join("holiday.jpg").exists());
        assert!(matches!(events[0], MoveEvent::Undateable { .. }));
    }

    #[test]
    fn cached_candidates_are_skipped() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let target = dir.path().join("archive");
        write_file(&source.join("vacation-2019-07-04.jpg"), b"pixels");
        fs::create_dir_all(&target).unwrap();

        let opts = options(source.clone(), target.clone());

        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        driver.run(|_| {}).unwrap();

        // Put an identical file back at the source path; the cache now
        // remembers it and the driver must not touch it again.
        write_file(&source.join("vacation-2019-07-04.jpg"), b"pixels");
        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        let summary = driver.run(|_| {}).unwrap();

        assert_eq!(summary.skipped_cached, 1);
        assert!(source.join("vacation-2019-07-04.jpg").exists());
    }

    #[test]
    fn duplicate_at_destination_is_removed_and_cached() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let target = dir.path().join("archive");
        write_file(&source.join("vacation-2019-07-04.jpg"), b"pixels");
        write_file(&target.join("2019/07/04/vacation-2019-07-04.jpg"), b"pixels");

        let opts = options(source.clone(), target.clone());
        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);

        let mut events = Vec::new();
        let summary = driver.run(|e| events.push(e)).unwrap();

        assert_eq!(summary.duplicates, 1);
        assert!(!source.join("vacation-2019-07-04.jpg").exists());
        assert!(matches!(
            events[0],
            MoveEvent::DuplicateAtDestination { removed: true, .. }
        ));
    }

    #[test]
    fn pretend_mode_saves_no_cache_and_moves_nothing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let target = dir.path().join("archive");
        write_file(&source.join("vacation-2019-07-04.jpg"), b"pixels");
        fs::create_dir_all(&target).unwrap();

        let opts = MoveOptions {
            pretend: true,
            ..options(source.clone(), target.clone())
        };
        let mut driver = MoveDriver::with_provider(&opts, NoMetadata);
        let summary = driver.run(|_| {}).unwrap();

        assert_eq!(summary.moved, 1); // the decision is still reported
        assert!(source.join("vacation-2019-07-04.jpg").exists());
        assert!(!target.join("2019").exists());
        assert!(!target.join(crate::core::cache::CACHE_FILE_NAME).exists());
    }
}
