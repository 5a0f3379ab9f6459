//! Concurrent multi-user availability directory.
//!
//! Holds every person's availability keyed by `(person, date)` in a sharded
//! concurrent map. A toggle holds the key's write lock for the whole
//! read-modify-write, so concurrent toggles of the same key serialize while
//! reads and toggles of other keys proceed in parallel.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use crate::availability::{Availability, PeerAvailability};
use crate::roster::PersonId;
use crate::slot::TimeSlot;

#[derive(Debug, Default)]
pub struct AvailabilityDirectory {
    slots: DashMap<(PersonId, NaiveDate), BTreeSet<TimeSlot>>,
}

impl AvailabilityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `hour` for `person` on `date` and return the resulting slots.
    pub fn toggle(&self, person: PersonId, date: NaiveDate, hour: TimeSlot) -> Vec<TimeSlot> {
        let mut entry = self.slots.entry((person, date)).or_default();
        if !entry.insert(hour) {
            entry.remove(&hour);
        }
        debug!(person, %date, hour, "toggled directory slot");
        entry.iter().copied().collect()
    }

    /// Replace `person`'s slots for `date`.
    pub fn set(
        &self,
        person: PersonId,
        date: NaiveDate,
        slots: impl IntoIterator<Item = TimeSlot>,
    ) {
        self.slots.insert((person, date), slots.into_iter().collect());
    }

    /// Ascending slots for `person` on `date`; empty when absent.
    pub fn slots_for(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        self.slots
            .get(&(person, date))
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All records held for `person`, ascending by date.
    pub fn records_for(&self, person: PersonId) -> Vec<Availability> {
        let mut records: Vec<Availability> = self
            .slots
            .iter()
            .filter(|entry| entry.key().0 == person)
            .map(|entry| Availability {
                date: entry.key().1,
                slots: entry.value().iter().copied().collect(),
            })
            .collect();
        records.sort_by_key(|record| record.date);
        records
    }
}

impl PeerAvailability for AvailabilityDirectory {
    fn peer_slots(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        self.slots_for(person, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use crate::availability::AvailabilityStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 22).unwrap()
    }

    #[test]
    fn concurrent_toggles_on_one_key_all_land() {
        let directory = Arc::new(AvailabilityDirectory::new());

        thread::scope(|scope| {
            for hour in 0..24 {
                let directory = Arc::clone(&directory);
                scope.spawn(move || {
                    directory.toggle(1, day(), hour);
                });
            }
        });

        assert_eq!(directory.slots_for(1, day()), (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn toggle_twice_restores_slots() {
        let directory = AvailabilityDirectory::new();
        directory.set(2, day(), [18, 19]);
        directory.toggle(2, day(), 20);
        assert_eq!(directory.toggle(2, day(), 20), vec![18, 19]);
    }

    #[test]
    fn serves_as_peer_source_for_a_store() {
        let directory = Arc::new(AvailabilityDirectory::new());
        directory.set(1, day(), [12, 13, 18]);
        directory.set(2, day(), [18, 19]);

        let mut store = AvailabilityStore::new(0, Arc::clone(&directory));
        store.toggle_slot(day(), 18);
        store.toggle_slot(day(), 12);

        assert_eq!(store.common_slots(day(), &[1, 2]), vec![18]);
        assert_eq!(directory.records_for(1).len(), 1);
    }
}
