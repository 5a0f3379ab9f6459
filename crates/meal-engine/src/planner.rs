//! Participant selection and event commits on top of an [`AvailabilityStore`].
//!
//! Mirrors the scheduling flow of the planner: pick people, read the common
//! slots for a date, then commit one of those slots to a restaurant.

use chrono::NaiveDate;
use tracing::debug;

use crate::availability::{AvailabilityStore, PeerAvailability};
use crate::error::{MealError, Result};
use crate::event::MealEvent;
use crate::roster::PersonId;
use crate::slot::TimeSlot;

#[derive(Debug)]
pub struct MealPlanner<P> {
    store: AvailabilityStore<P>,
    selection: Vec<PersonId>,
    events: Vec<MealEvent>,
}

impl<P: PeerAvailability> MealPlanner<P> {
    pub fn new(store: AvailabilityStore<P>) -> Self {
        Self {
            store,
            selection: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &AvailabilityStore<P> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AvailabilityStore<P> {
        &mut self.store
    }

    /// Add `person` to the selection, or remove them if already selected.
    /// Returns whether `person` is selected afterwards.
    pub fn toggle_participant(&mut self, person: PersonId) -> bool {
        if let Some(pos) = self.selection.iter().position(|&p| p == person) {
            self.selection.remove(pos);
            false
        } else {
            self.selection.push(person);
            true
        }
    }

    /// Selected participants in the order they were picked.
    pub fn selected(&self) -> &[PersonId] {
        &self.selection
    }

    /// Common slots on `date` for the current selection.
    pub fn common_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        self.store.common_slots(date, &self.selection)
    }

    /// Commit a meal at `hour` on `date` with the current selection.
    ///
    /// # Errors
    /// - `MealError::EmptyRestaurant` if `restaurant` is blank.
    /// - `MealError::SlotUnavailable` if `hour` is not a common slot for the
    ///   selection on `date` (which includes an empty selection).
    pub fn commit(
        &mut self,
        date: NaiveDate,
        hour: TimeSlot,
        restaurant: &str,
    ) -> Result<&MealEvent> {
        if restaurant.trim().is_empty() {
            return Err(MealError::EmptyRestaurant);
        }
        if !self.common_slots(date).contains(&hour) {
            return Err(MealError::SlotUnavailable { date, hour });
        }

        let event = MealEvent::new(date, hour, restaurant, self.selection.clone());
        debug!(event_id = %event.id(), %date, hour, restaurant, "committed meal");
        let index = self.events.len();
        self.events.push(event);
        let committed = &self.events[index];
        Ok(committed)
    }

    /// Committed events, in commit order.
    pub fn events(&self) -> &[MealEvent] {
        &self.events
    }

    /// Committed events on `date`, in commit order.
    pub fn events_on(&self, date: NaiveDate) -> impl Iterator<Item = &MealEvent> {
        self.events.iter().filter(move |e| e.date() == date)
    }

    /// Distinct dates with at least one committed event, ascending.
    pub fn event_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.events.iter().map(MealEvent::date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}
