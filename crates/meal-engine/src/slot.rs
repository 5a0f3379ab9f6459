//! Hour-of-day slot vocabulary.
//!
//! A slot is a one-hour window identified by its starting hour. The planner UI
//! only offers the catalog hours (9 AM through 9 PM), but every algorithm in
//! this crate accepts any hour value.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{MealError, Result};

/// An hour-of-day slot. Valid clock hours are `0..=23`.
pub type TimeSlot = u32;

/// First hour offered by the slot catalog.
pub const CATALOG_FIRST: TimeSlot = 9;

/// Last hour offered by the slot catalog.
pub const CATALOG_LAST: TimeSlot = 21;

/// The fixed catalog of slots a user can mark as free.
pub fn catalog() -> RangeInclusive<TimeSlot> {
    CATALOG_FIRST..=CATALOG_LAST
}

/// Twelve-hour display label for a slot, e.g. `"9:00 AM"` or `"1:00 PM"`.
///
/// Returns `None` for hours outside `0..=23`.
pub fn slot_label(hour: TimeSlot) -> Option<String> {
    if hour > 23 {
        return None;
    }
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    Some(format!("{}:00 {}", display, suffix))
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
/// Returns `MealError::InvalidDate` for malformed or impossible dates
/// (e.g. `2025-02-30`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| MealError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse an IANA timezone name (e.g. `"America/Los_Angeles"`).
///
/// # Errors
/// Returns `MealError::InvalidTimezone` if the name is not in the tz database.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| MealError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_twelve_hour_clock() {
        assert_eq!(slot_label(0).as_deref(), Some("12:00 AM"));
        assert_eq!(slot_label(9).as_deref(), Some("9:00 AM"));
        assert_eq!(slot_label(12).as_deref(), Some("12:00 PM"));
        assert_eq!(slot_label(13).as_deref(), Some("1:00 PM"));
        assert_eq!(slot_label(21).as_deref(), Some("9:00 PM"));
        assert_eq!(slot_label(24), None);
    }

    #[test]
    fn catalog_spans_nine_to_nine() {
        let hours: Vec<TimeSlot> = catalog().collect();
        assert_eq!(hours.len(), 13);
        assert_eq!(hours.first(), Some(&9));
        assert_eq!(hours.last(), Some(&21));
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert!(parse_date("2025-10-22").is_ok());
        assert!(matches!(
            parse_date("2025-02-30"),
            Err(MealError::InvalidDate(_))
        ));
        assert!(matches!(parse_date("22/10/2025"), Err(MealError::InvalidDate(_))));
    }

    #[test]
    fn parse_timezone_validates_names() {
        assert!(parse_timezone("Europe/London").is_ok());
        assert_eq!(
            parse_timezone("Mars/Olympus"),
            Err(MealError::InvalidTimezone("Mars/Olympus".to_string()))
        );
    }
}
