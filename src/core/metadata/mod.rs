//! # Metadata Module
//!
//! EXIF-backed implementation of the [`MetadataProvider`] seam.
//!
//! Only the original-capture timestamp matters to the organizer:
//! `DateTimeOriginal`, refined by `SubSecTimeOriginal` when present. All
//! failures (unreadable file, no EXIF container, missing tag, malformed
//! value) are silent - the resolver simply falls back to the file name.

use crate::core::dates::{MetadataProvider, OriginalDate};
use chrono::{NaiveDateTime, Timelike};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Metadata provider reading EXIF tags from the file itself
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifProvider;

impl MetadataProvider for ExifProvider {
    fn original_date(&self, path: &Path) -> Option<OriginalDate> {
        let exif = read_container(path)?;

        let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
        let datetime = parse_exif_datetime(ascii_value(&field.value)?)?;

        let subsec = exif
            .get_field(Tag::SubSecTimeOriginal, In::PRIMARY)
            .and_then(|f| ascii_value(&f.value))
            .and_then(|s| s.trim().parse::<u32>().ok());

        match subsec {
            Some(millis) => Some(OriginalDate {
                datetime: datetime
                    .with_nanosecond((millis % 1_000) * 1_000_000)
                    .unwrap_or(datetime),
                has_subsec: true,
            }),
            None => Some(OriginalDate {
                datetime,
                has_subsec: false,
            }),
        }
    }
}

fn read_container(path: &Path) -> Option<exif::Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    Reader::new().read_from_container(&mut reader).ok()
}

fn ascii_value(value: &Value) -> Option<&str> {
    match value {
        Value::Ascii(vec) => vec.first().and_then(|bytes| std::str::from_utf8(bytes).ok()),
        _ => None,
    }
}

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(datetime);
    }
    // Some writers use dashes in the date part
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

/// All tags embedded in a file, for the `info` command.
///
/// `None` when the file has no readable metadata container.
pub fn tag_listing(path: &Path) -> Option<Vec<(String, String)>> {
    let exif = read_container(path)?;
    Some(
        exif.fields()
            .map(|field| {
                (
                    field.tag.to_string(),
                    field.display_value().with_unit(&exif).to_string(),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn parses_exif_datetime_formats() {
        let datetime = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(
            datetime.date(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(datetime.hour(), 14);

        let dashed = parse_exif_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dashed, datetime);

        assert!(parse_exif_datetime("not a date").is_none());
    }

    #[test]
    fn unreadable_file_fails_silently() {
        let provider = ExifProvider;
        assert!(provider
            .original_date(Path::new("/nonexistent/img.jpg"))
            .is_none());
    }

    #[test]
    fn tagless_file_fails_silently() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"not an image at all").unwrap();

        let provider = ExifProvider;
        assert!(provider.original_date(&path).is_none());
        assert!(tag_listing(&path).is_none());
    }
}
