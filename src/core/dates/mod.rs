//! # Date Resolver
//!
//! Infers the creation date of a file from up to three independent sources:
//!
//! 1. An embedded-metadata original-capture timestamp (authoritative when
//!    present, supplied through the [`MetadataProvider`] seam)
//! 2. A date parsed from the file name ([`name::date_from_name`])
//! 3. A `YYYY/MM/DD` folder structure embedded in the path
//!    ([`date_from_path`])
//!
//! Path-derived dates are only ever used for consistency checking against an
//! already-resolved creation date; they never feed back into resolution.

mod name;

pub use name::date_from_name;

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// An original-capture timestamp reported by a metadata provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalDate {
    pub datetime: NaiveDateTime,
    /// Whether a sub-second component was present in the metadata
    pub has_subsec: bool,
}

/// Opaque provider of embedded original-capture timestamps.
///
/// Implementations fail silently (return `None`) on unreadable or tag-less
/// files.
pub trait MetadataProvider {
    fn original_date(&self, path: &Path) -> Option<OriginalDate>;
}

/// Where a resolved creation date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Metadata,
    Name,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::Metadata => write!(f, "EXIF"),
            DateSource::Name => write!(f, "name"),
        }
    }
}

/// A creation date together with the source that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub datetime: NaiveDateTime,
    pub source: DateSource,
}

/// Resolves creation dates, preferring metadata over the file name
pub struct DateResolver<P: MetadataProvider> {
    provider: P,
}

impl<P: MetadataProvider> DateResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Infer the creation date of `path`, or `None` if the file is
    /// undateable. Metadata wins; the file name is the fallback.
    pub fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        if let Some(original) = self.provider.original_date(path) {
            return Some(ResolvedDate {
                datetime: original.datetime,
                source: DateSource::Metadata,
            });
        }

        let file_name = path.file_name()?.to_str()?;
        name::date_from_name(file_name).map(|date| ResolvedDate {
            datetime: date.and_time(NaiveTime::MIN),
            source: DateSource::Name,
        })
    }
}

/// Date components embedded in a path's folder structure.
///
/// Absent components are zero, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PathDate {
    pub fn has_year(&self) -> bool {
        self.year != 0
    }

    /// True when every component agrees with `datetime`. An absent (zero)
    /// component never matches a real date.
    pub fn matches(&self, datetime: &NaiveDateTime) -> bool {
        self.year == datetime.year() && self.month == datetime.month() && self.day == datetime.day()
    }
}

fn path_ymd_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*)/((?:19|20)[0-9]{2})/([01][0-9])/([0-3][0-9])/(.*)$")
            .expect("valid path date pattern")
    })
}

fn path_ym_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*)/((?:19|20)[0-9]{2})/([01][0-9])/(.*)$")
            .expect("valid path date pattern")
    })
}

fn path_y_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*)/((?:19|20)[0-9]{2})/(.*)$").expect("valid path date pattern")
    })
}

/// Extract an embedded `YYYY/MM/DD`, `YYYY/MM`, or `YYYY` folder structure
/// from `path`, anchored at path component boundaries. The rightmost match
/// wins; absent components are reported as zero. Returns the date components
/// and the residual name after them.
///
/// This is always computed independently of [`DateResolver::resolve`] and
/// must never feed back into it.
pub fn date_from_path(path: &Path) -> (PathDate, String) {
    let text = path.to_string_lossy();

    if let Some(caps) = path_ymd_re().captures(&text) {
        let date = PathDate {
            year: caps[2].parse().unwrap_or(0),
            month: caps[3].parse().unwrap_or(0),
            day: caps[4].parse().unwrap_or(0),
        };
        return (date, caps[5].to_string());
    }

    if let Some(caps) = path_ym_re().captures(&text) {
        let date = PathDate {
            year: caps[2].parse().unwrap_or(0),
            month: caps[3].parse().unwrap_or(0),
            day: 0,
        };
        return (date, caps[4].to_string());
    }

    if let Some(caps) = path_y_re().captures(&text) {
        let date = PathDate {
            year: caps[2].parse().unwrap_or(0),
            month: 0,
            day: 0,
        };
        return (date, caps[3].to_string());
    }

    (PathDate::default(), text.to_string())
}
