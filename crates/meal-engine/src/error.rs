//! Error types for meal-engine operations.
//!
//! Missing data (no availability record, empty selection, unknown participant
//! name) is never an error; these variants cover rejected input only.

use chrono::NaiveDate;
use thiserror::Error;

use crate::slot::TimeSlot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MealError {
    #[error("Invalid hour {0}: must be within 0..=23")]
    InvalidHour(TimeSlot),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The wall-clock start does not exist in the export zone (DST gap)
    /// and the exporter was configured to reject such times.
    #[error("Local time {date} {hour:02}:00 does not exist in the export timezone")]
    NonexistentLocalTime { date: NaiveDate, hour: TimeSlot },

    #[error("Event time out of range: {0}")]
    OutOfRange(String),

    #[error("Restaurant name must not be empty")]
    EmptyRestaurant,

    #[error("Slot {hour:02}:00 on {date} is not free for every selected participant")]
    SlotUnavailable { date: NaiveDate, hour: TimeSlot },
}

pub type Result<T> = std::result::Result<T, MealError>;
