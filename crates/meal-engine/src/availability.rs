//! Per-person, per-date availability and common-slot intersection.
//!
//! The [`AvailabilityStore`] exclusively owns the current user's availability.
//! Peer availability is read through an injected [`PeerAvailability`]
//! accessor which the store never mutates.
//!
//! Every slot list leaving this module is ascending and free of duplicates,
//! regardless of how the underlying data was supplied.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::roster::PersonId;
use crate::slot::TimeSlot;

/// The free slots of one person on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

impl Availability {
    pub fn new(date: NaiveDate, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        Self {
            date,
            slots: sorted_unique(slots),
        }
    }
}

/// Read-only access to other people's availability.
///
/// Implementations may return slots in any order and with duplicates; the
/// store normalizes them. An unknown person or date yields an empty list.
pub trait PeerAvailability {
    fn peer_slots(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot>;
}

impl<T: PeerAvailability + ?Sized> PeerAvailability for &T {
    fn peer_slots(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        (**self).peer_slots(person, date)
    }
}

impl<T: PeerAvailability + ?Sized> PeerAvailability for Arc<T> {
    fn peer_slots(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        (**self).peer_slots(person, date)
    }
}

/// A fixed in-memory lookup table of peer availability.
#[derive(Debug, Clone, Default)]
pub struct PeerTable {
    people: HashMap<PersonId, BTreeMap<NaiveDate, BTreeSet<TimeSlot>>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `person`'s slots for `date`, replacing any previous entry.
    pub fn insert(
        &mut self,
        person: PersonId,
        date: NaiveDate,
        slots: impl IntoIterator<Item = TimeSlot>,
    ) {
        self.people
            .entry(person)
            .or_default()
            .insert(date, slots.into_iter().collect());
    }

    /// Number of people with at least one entry.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl FromIterator<(PersonId, Availability)> for PeerTable {
    fn from_iter<I: IntoIterator<Item = (PersonId, Availability)>>(iter: I) -> Self {
        let mut table = PeerTable::new();
        for (person, availability) in iter {
            table
                .people
                .entry(person)
                .or_default()
                .entry(availability.date)
                .or_default()
                .extend(availability.slots);
        }
        table
    }
}

impl PeerAvailability for PeerTable {
    fn peer_slots(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        self.people
            .get(&person)
            .and_then(|dates| dates.get(&date))
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// The current user's availability plus read access to everyone else's.
#[derive(Debug, Clone)]
pub struct AvailabilityStore<P> {
    self_id: PersonId,
    mine: BTreeMap<NaiveDate, BTreeSet<TimeSlot>>,
    peers: P,
}

impl<P: PeerAvailability> AvailabilityStore<P> {
    /// Create an empty store for the user `self_id`.
    pub fn new(self_id: PersonId, peers: P) -> Self {
        Self {
            self_id,
            mine: BTreeMap::new(),
            peers,
        }
    }

    /// Create a store seeded with previously saved records.
    ///
    /// Records sharing a date are merged, keeping at most one record per date.
    pub fn from_records(
        self_id: PersonId,
        records: impl IntoIterator<Item = Availability>,
        peers: P,
    ) -> Self {
        let mut store = Self::new(self_id, peers);
        for record in records {
            store.mine.entry(record.date).or_default().extend(record.slots);
        }
        store
    }

    pub fn self_id(&self) -> PersonId {
        self.self_id
    }

    pub fn peers(&self) -> &P {
        &self.peers
    }

    /// Flip `hour` in the user's slots for `date` and return the resulting
    /// slots in ascending order.
    ///
    /// The first toggle on a date creates the record. Toggling the last slot
    /// off leaves an empty record in place (see [`prune_empty`](Self::prune_empty)).
    pub fn toggle_slot(&mut self, date: NaiveDate, hour: TimeSlot) -> Vec<TimeSlot> {
        let slots = self.mine.entry(date).or_default();
        let now_free = slots.insert(hour);
        if !now_free {
            slots.remove(&hour);
        }
        debug!(%date, hour, now_free, "toggled slot");
        slots.iter().copied().collect()
    }

    /// The user's own slots for `date`; empty when no record exists.
    pub fn my_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        self.mine
            .get(&date)
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Slots for any person on `date`, ascending. The store's own id reads
    /// the owned records; any other id goes to the peer accessor.
    pub fn slots_for(&self, person: PersonId, date: NaiveDate) -> Vec<TimeSlot> {
        if person == self.self_id {
            self.my_slots(date)
        } else {
            sorted_unique(self.peers.peer_slots(person, date))
        }
    }

    /// Slots on `date` free for the user and every one of `participants`.
    ///
    /// An empty participant list yields an empty result: common availability
    /// is only defined relative to at least one other person. The result is
    /// ascending and does not depend on the order of `participants`.
    pub fn common_slots(&self, date: NaiveDate, participants: &[PersonId]) -> Vec<TimeSlot> {
        if participants.is_empty() {
            return Vec::new();
        }

        let mut common: BTreeSet<TimeSlot> = match self.mine.get(&date) {
            Some(slots) => slots.clone(),
            None => return Vec::new(),
        };

        for &person in participants {
            if person == self.self_id {
                continue;
            }
            let theirs: BTreeSet<TimeSlot> =
                self.peers.peer_slots(person, date).into_iter().collect();
            if theirs.is_empty() {
                trace!(%date, person, "participant has no slots; no common availability");
                return Vec::new();
            }
            common.retain(|slot| theirs.contains(slot));
            if common.is_empty() {
                break;
            }
        }

        common.into_iter().collect()
    }

    /// Dates that carry a record for the user, ascending. Includes dates whose
    /// record has been toggled down to empty.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.mine.keys().copied().collect()
    }

    /// Snapshot of the user's records, ascending by date.
    pub fn records(&self) -> Vec<Availability> {
        self.mine
            .iter()
            .map(|(date, slots)| Availability {
                date: *date,
                slots: slots.iter().copied().collect(),
            })
            .collect()
    }

    /// Drop records with no free slots. Returns how many were removed.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.mine.len();
        self.mine.retain(|_, slots| !slots.is_empty());
        before - self.mine.len()
    }
}

fn sorted_unique(slots: impl IntoIterator<Item = TimeSlot>) -> Vec<TimeSlot> {
    let mut slots: Vec<TimeSlot> = slots.into_iter().collect();
    slots.sort_unstable();
    slots.dedup();
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    struct Unsorted;

    impl PeerAvailability for Unsorted {
        fn peer_slots(&self, _person: PersonId, _date: NaiveDate) -> Vec<TimeSlot> {
            vec![20, 12, 18, 12, 19]
        }
    }

    #[test]
    fn peer_slots_are_normalized() {
        let store = AvailabilityStore::new(0, Unsorted);
        assert_eq!(store.slots_for(1, day(22)), vec![12, 18, 19, 20]);
    }

    #[test]
    fn toggle_keeps_empty_record_until_pruned() {
        let mut store = AvailabilityStore::new(0, PeerTable::new());
        store.toggle_slot(day(22), 12);
        assert!(store.toggle_slot(day(22), 12).is_empty());
        assert_eq!(store.available_dates(), vec![day(22)]);
        assert_eq!(store.prune_empty(), 1);
        assert!(store.available_dates().is_empty());
    }

    #[test]
    fn from_records_merges_duplicate_dates() {
        let store = AvailabilityStore::from_records(
            0,
            vec![
                Availability::new(day(22), [19, 12]),
                Availability::new(day(22), [13, 12]),
            ],
            PeerTable::new(),
        );
        assert_eq!(store.records(), vec![Availability::new(day(22), [12, 13, 19])]);
    }

    #[test]
    fn self_in_participants_does_not_change_result() {
        let mut peers = PeerTable::new();
        peers.insert(1, day(22), [12, 18]);
        let store = AvailabilityStore::from_records(
            0,
            vec![Availability::new(day(22), [12, 13, 18])],
            peers,
        );
        assert_eq!(store.common_slots(day(22), &[0, 1]), vec![12, 18]);
        assert_eq!(store.common_slots(day(22), &[0]), vec![12, 13, 18]);
    }
}
