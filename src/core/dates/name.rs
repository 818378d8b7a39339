//! Filename date parser strategies.
//!
//! An ordered list of independent parsers, tried in priority order; the
//! first one producing a calendar-valid date wins. Every pattern carries
//! digit/letter boundary guards so it cannot match inside a longer numeric
//! token.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Three-letter month prefixes, in calendar order
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

type Strategy = fn(&str) -> Option<NaiveDate>;

/// Parser strategies in priority order
const STRATEGIES: [Strategy; 3] = [iso_date, textual_month_first, textual_day_first];

/// Parse a date out of a file name, trying each strategy in turn.
///
/// A match that fails calendar validation (day 32, month 13, ...) is
/// discarded and the remaining strategies still get their chance.
pub fn date_from_name(name: &str) -> Option<NaiveDate> {
    STRATEGIES.iter().find_map(|parse| parse(name))
}

/// Month number for a textual month, matched by its first three letters
fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 || !word.is_ascii() {
        return None;
    }
    let prefix = word[..3].to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|month| *month == prefix)
        .map(|index| index as u32 + 1)
}

/// Names of the form `...YYYY-MM-DD...` or `...YYYYMMDD...`
fn iso_date(name: &str) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})-?([01][0-9])-?([0-3][0-9])(?:[^0-9]|$)")
            .expect("valid iso date pattern")
    });

    let caps = re.captures(name)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Names of the form `...Jan 16, 2017...` or `...January 16, 2007...`
fn textual_month_first(name: &str) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?:^|[^0-9A-Za-z])([A-Za-z]+)[^0-9A-Za-z]+([0-9]{1,2})[^A-Za-z0-9]+((?:19|20)[0-9]{2})(?:$|[^0-9])",
        )
        .expect("valid textual date pattern")
    });

    let caps = re.captures(name)?;
    let month = month_number(&caps[1])?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Names of the form `...16 Jan, 2017...` or `...16 January, 2007...`
fn textual_day_first(name: &str) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?:^|[^0-9A-Za-z])([0-9]{1,2})[^0-9A-Za-z]+([A-Za-z]+)[^A-Za-z0-9]+((?:19|20)[0-9]{2})(?:$|[^0-9])",
        )
        .expect("valid textual date pattern")
    });

    let caps = re.captures(name)?;
    let day = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
