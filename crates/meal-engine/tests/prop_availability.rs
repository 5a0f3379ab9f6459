//! Property-based tests for the availability store and export timestamps.
//!
//! These check invariants that should hold for any availability data, not
//! just the scenarios in `availability_tests.rs` and `export_tests.rs`.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Timelike};
use meal_engine::{
    AvailabilityStore, EventExporter, MealEvent, PeerTable, PersonId, Roster, TimeSlot,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const ME: PersonId = 0;

/// Dates in 2025-2027; day capped at 28 to avoid invalid month/day combos.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2025i32..=2027, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Arbitrary slot lists, unsorted and possibly with duplicates.
fn arb_slots() -> impl Strategy<Value = Vec<TimeSlot>> {
    prop::collection::vec(0u32..=30, 0..12)
}

/// Up to five peers (ids 1..=5), each with a slot list for the test date.
fn arb_peer_slots() -> impl Strategy<Value = Vec<Vec<TimeSlot>>> {
    prop::collection::vec(arb_slots(), 0..=5)
}

fn arb_timezone() -> impl Strategy<Value = chrono_tz::Tz> {
    prop_oneof![
        Just(chrono_tz::UTC),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::America::Los_Angeles),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Asia::Tokyo),
        Just(chrono_tz::Australia::Sydney),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_store(
    date: NaiveDate,
    mine: &[TimeSlot],
    peers: &[Vec<TimeSlot>],
) -> AvailabilityStore<PeerTable> {
    let mut table = PeerTable::new();
    for (i, slots) in peers.iter().enumerate() {
        table.insert(i as PersonId + 1, date, slots.iter().copied());
    }
    let mut store = AvailabilityStore::new(ME, table);
    for &slot in mine {
        if !store.my_slots(date).contains(&slot) {
            store.toggle_slot(date, slot);
        }
    }
    store
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn stamp_after(document: &str, name: &str) -> NaiveDateTime {
    let prefix = format!("{}:", name);
    let value = document
        .lines()
        .find_map(|l| l.strip_prefix(prefix.as_str()))
        .unwrap();
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ").unwrap()
}

proptest! {
    #![proptest_config(config())]

    // -----------------------------------------------------------------------
    // Property 1: toggling the same slot twice restores the slot set
    // -----------------------------------------------------------------------
    #[test]
    fn toggle_is_an_involution(
        date in arb_date(),
        mine in arb_slots(),
        hour in 0u32..=30,
    ) {
        let mut store = build_store(date, &mine, &[]);
        let before = store.my_slots(date);
        store.toggle_slot(date, hour);
        let after = store.toggle_slot(date, hour);
        prop_assert_eq!(before, after);
    }

    // -----------------------------------------------------------------------
    // Property 2: toggle output is strictly ascending
    // -----------------------------------------------------------------------
    #[test]
    fn toggle_output_is_strictly_ascending(
        date in arb_date(),
        hours in arb_slots(),
    ) {
        let mut store = AvailabilityStore::new(ME, PeerTable::new());
        for hour in hours {
            let slots = store.toggle_slot(date, hour);
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1], "not strictly ascending: {:?}", slots);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Property 3: no participants means no common slots
    // -----------------------------------------------------------------------
    #[test]
    fn empty_selection_yields_nothing(
        date in arb_date(),
        mine in arb_slots(),
        peers in arb_peer_slots(),
    ) {
        let store = build_store(date, &mine, &peers);
        prop_assert!(store.common_slots(date, &[]).is_empty());
    }

    // -----------------------------------------------------------------------
    // Property 4: permuting participants gives identical output
    // -----------------------------------------------------------------------
    #[test]
    fn common_slots_ignore_participant_order(
        date in arb_date(),
        mine in arb_slots(),
        peers in arb_peer_slots(),
        seed in any::<u64>(),
    ) {
        let store = build_store(date, &mine, &peers);
        let ids: Vec<PersonId> = (1..=peers.len() as PersonId).collect();
        let mut permuted = ids.clone();
        // Deterministic Fisher-Yates driven by the seed.
        let mut state = seed;
        for i in (1..permuted.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            permuted.swap(i, j);
        }
        prop_assert_eq!(store.common_slots(date, &ids), store.common_slots(date, &permuted));
    }

    // -----------------------------------------------------------------------
    // Property 5: common slots are a sorted subset of self and of each peer
    // -----------------------------------------------------------------------
    #[test]
    fn common_slots_are_sorted_subset(
        date in arb_date(),
        mine in arb_slots(),
        peers in arb_peer_slots(),
    ) {
        let store = build_store(date, &mine, &peers);
        let ids: Vec<PersonId> = (1..=peers.len() as PersonId).collect();
        let common = store.common_slots(date, &ids);
        let own = store.slots_for(ME, date);

        for pair in common.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for slot in &common {
            prop_assert!(own.contains(slot));
            for &id in &ids {
                prop_assert!(store.slots_for(id, date).contains(slot));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Property 6: a slot free for everyone appears in the result
    // -----------------------------------------------------------------------
    #[test]
    fn shared_slots_are_never_dropped(
        date in arb_date(),
        mine in arb_slots(),
        peers in arb_peer_slots(),
    ) {
        let store = build_store(date, &mine, &peers);
        let ids: Vec<PersonId> = (1..=peers.len() as PersonId).collect();
        prop_assume!(!ids.is_empty());
        let common = store.common_slots(date, &ids);
        for slot in store.slots_for(ME, date) {
            let everyone = ids.iter().all(|&id| store.slots_for(id, date).contains(&slot));
            prop_assert_eq!(everyone, common.contains(&slot));
        }
    }

    // -----------------------------------------------------------------------
    // Property 7: exported timestamps round-trip to the local date and hour
    // -----------------------------------------------------------------------
    #[test]
    fn export_round_trips_local_wall_clock(
        date in arb_date(),
        hour in 0u32..=23,
        tz in arb_timezone(),
    ) {
        let local = date.and_hms_opt(hour, 0, 0).unwrap();
        // Times inside a DST gap are shifted; they cannot round-trip.
        prop_assume!(tz.from_local_datetime(&local).earliest().is_some());

        let event = MealEvent::new(date, hour, "Cafe", vec![]);
        let exported = EventExporter::new(tz).export(&event, &Roster::new()).unwrap();

        let start = stamp_after(&exported.document, "DTSTART");
        let end = stamp_after(&exported.document, "DTEND");
        let start_local = tz.from_utc_datetime(&start);

        prop_assert_eq!(start_local.date_naive(), date);
        prop_assert_eq!(start_local.hour(), hour);
        prop_assert_eq!((end - start).num_minutes(), 120);
    }
}
