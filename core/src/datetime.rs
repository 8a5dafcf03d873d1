//! Strict date parsing for the `date` type and its bounds.

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

/// Parses `text` against a strftime `pattern`, strictly.
///
/// The whole trimmed input must be consumed by the pattern; partial
/// matches are rejected. A date-only pattern yields midnight. Returns
/// `None` on any mismatch (the caller decides whether that is a data
/// failure or a prototype error).
///
/// # Examples
///
/// ```
/// use json_prototype_core::datetime::parse_date;
///
/// assert!(parse_date("2013-05-17 09:30:00", "%Y-%m-%d %H:%M:%S").is_some());
/// assert!(parse_date("2013-05-17", "%Y-%m-%d").is_some());
/// assert!(parse_date("2013-05-17x", "%Y-%m-%d").is_none());
/// assert!(parse_date("  ", "%Y-%m-%d").is_none());
/// ```
pub fn parse_date(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
        return Some(dt);
    }
    // Date-only patterns carry no time-of-day fields.
    NaiveDate::parse_from_str(text, pattern)
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Checks that a strftime pattern is well-formed.
///
/// Used at engine construction so a bad `date_pattern` option fails fast
/// instead of at first use.
pub fn pattern_is_valid(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
