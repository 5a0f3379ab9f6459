//! Committed meal events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;

use crate::roster::PersonId;
use crate::slot::TimeSlot;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique event identifier.
///
/// Ids come from a single atomic counter, so two events created in the same
/// process never share one, even when created concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    fn next() -> Self {
        Self(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A meal committed to a date, hour and restaurant.
///
/// Immutable once created; exporting only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealEvent {
    id: EventId,
    date: NaiveDate,
    hour: TimeSlot,
    restaurant: String,
    participants: Vec<PersonId>,
}

impl MealEvent {
    /// Create an event with a fresh id. `participants` keeps its order.
    ///
    /// The hour is not validated here; [`EventExporter`](crate::ics::EventExporter)
    /// rejects hours outside `0..=23`.
    pub fn new(
        date: NaiveDate,
        hour: TimeSlot,
        restaurant: impl Into<String>,
        participants: Vec<PersonId>,
    ) -> Self {
        Self {
            id: EventId::next(),
            date,
            hour,
            restaurant: restaurant.into(),
            participants,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> TimeSlot {
        self.hour
    }

    pub fn restaurant(&self) -> &str {
        &self.restaurant
    }

    pub fn participants(&self) -> &[PersonId] {
        &self.participants
    }
}
