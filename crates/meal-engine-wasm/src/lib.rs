//! WASM bindings for meal-engine.
//!
//! Exposes common-slot computation, slot toggling and `.ics` export to
//! JavaScript via `wasm-bindgen`. All complex types are passed as JSON
//! strings. The bindings are stateless: the caller owns the availability
//! records and passes them in on every call.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p meal-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/meal_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use meal_engine::{
    Availability, AvailabilityStore, EscapeMode, EventExporter, MealEvent, PeerTable, Person,
    PersonId, Roster, TimeSlot,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for a peer availability record.
#[derive(Deserialize)]
struct PeerInput {
    person: PersonId,
    date: NaiveDate,
    slots: Vec<TimeSlot>,
}

/// Input format for an event to export.
#[derive(Deserialize)]
struct EventInput {
    date: NaiveDate,
    hour: TimeSlot,
    restaurant: String,
    #[serde(default)]
    participants: Vec<PersonId>,
}

#[derive(Serialize)]
struct ExportDto {
    document: String,
    filename: String,
    media_type: &'static str,
}

#[derive(Serialize)]
struct SlotDto {
    hour: TimeSlot,
    label: String,
}

// ---------------------------------------------------------------------------
// JSON-level implementations (plain `String` errors, testable off-wasm)
// ---------------------------------------------------------------------------

fn parse_json<'a, T: Deserialize<'a>>(what: &str, json: &'a str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn store_from_json(
    self_id: PersonId,
    mine_json: &str,
    peers_json: &str,
) -> Result<AvailabilityStore<PeerTable>, String> {
    let mine: Vec<Availability> = parse_json("availability", mine_json)?;
    let peers: Vec<PeerInput> = parse_json("peers", peers_json)?;
    let table: PeerTable = peers
        .into_iter()
        .map(|p| (p.person, Availability::new(p.date, p.slots)))
        .collect();
    Ok(AvailabilityStore::from_records(self_id, mine, table))
}

fn common_slots_json(
    self_id: PersonId,
    mine_json: &str,
    peers_json: &str,
    date: &str,
    participants_json: &str,
) -> Result<String, String> {
    let store = store_from_json(self_id, mine_json, peers_json)?;
    let date = meal_engine::parse_date(date).map_err(|e| e.to_string())?;
    let participants: Vec<PersonId> = parse_json("participants", participants_json)?;
    to_json(&store.common_slots(date, &participants))
}

fn toggle_slot_json(mine_json: &str, date: &str, hour: TimeSlot) -> Result<String, String> {
    let mut store = store_from_json(PersonId::default(), mine_json, "[]")?;
    let date = meal_engine::parse_date(date).map_err(|e| e.to_string())?;
    store.toggle_slot(date, hour);
    to_json(&store.records())
}

fn export_event_json(
    event_json: &str,
    people_json: &str,
    timezone: &str,
    escape: &str,
) -> Result<String, String> {
    let input: EventInput = parse_json("event", event_json)?;
    let people: Vec<Person> = parse_json("people", people_json)?;
    let tz = meal_engine::parse_timezone(timezone).map_err(|e| e.to_string())?;
    let escape = match escape {
        "" | "rfc5545" => EscapeMode::Rfc5545,
        "verbatim" => EscapeMode::Verbatim,
        other => return Err(format!("Unknown escape mode: '{}'", other)),
    };

    let event = MealEvent::new(input.date, input.hour, input.restaurant, input.participants);
    let exported = EventExporter::new(tz)
        .with_escape(escape)
        .export(&event, &Roster::from(people))
        .map_err(|e| e.to_string())?;

    to_json(&ExportDto {
        media_type: exported.media_type(),
        document: exported.document,
        filename: exported.filename,
    })
}

fn slot_catalog_json() -> Result<String, String> {
    let slots: Vec<SlotDto> = meal_engine::catalog()
        .filter_map(|hour| meal_engine::slot_label(hour).map(|label| SlotDto { hour, label }))
        .collect();
    to_json(&slots)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Slots free for the caller and every participant on `date`.
///
/// - `self_id` -- the caller's person id; `mine_json` holds this person's slots
/// - `mine_json` -- JSON array of `{date, slots}` records (the caller's own)
/// - `peers_json` -- JSON array of `{person, date, slots}` records; records whose
///   `person` equals `self_id` are ignored in favour of `mine_json`
/// - `date` -- ISO 8601 date (e.g., "2025-10-22")
/// - `participants_json` -- JSON array of person ids; `self_id` in this list is
///   skipped since the caller is always included
///
/// Returns a JSON array of hours, ascending.
#[wasm_bindgen(js_name = "commonSlots")]
pub fn common_slots(
    self_id: u32,
    mine_json: &str,
    peers_json: &str,
    date: &str,
    participants_json: &str,
) -> Result<String, JsValue> {
    common_slots_json(self_id, mine_json, peers_json, date, participants_json)
        .map_err(|e| JsValue::from_str(&e))
}

/// Toggle `hour` on `date` in the caller's records.
///
/// Only the caller's own `{date, slots}` records are involved, so no person id
/// is needed.
///
/// Returns the updated JSON array of `{date, slots}` records, ascending by date.
#[wasm_bindgen(js_name = "toggleSlot")]
pub fn toggle_slot(mine_json: &str, date: &str, hour: u32) -> Result<String, JsValue> {
    toggle_slot_json(mine_json, date, hour).map_err(|e| JsValue::from_str(&e))
}

/// Render a meal as an `.ics` document.
///
/// - `event_json` -- `{date, hour, restaurant, participants}`
/// - `people_json` -- JSON array of `{id, name, initials?, tag?}` used for names
/// - `timezone` -- IANA timezone the date and hour are expressed in
/// - `escape` -- `"rfc5545"` (default when empty) or `"verbatim"`
///
/// Returns `{document, filename, media_type}` as JSON.
#[wasm_bindgen(js_name = "exportEvent")]
pub fn export_event(
    event_json: &str,
    people_json: &str,
    timezone: &str,
    escape: &str,
) -> Result<String, JsValue> {
    export_event_json(event_json, people_json, timezone, escape)
        .map_err(|e| JsValue::from_str(&e))
}

/// Twelve-hour label for an hour, or `undefined` outside 0-23.
#[wasm_bindgen(js_name = "slotLabel")]
pub fn slot_label(hour: u32) -> Option<String> {
    meal_engine::slot_label(hour)
}

/// The slot catalog as a JSON array of `{hour, label}`.
#[wasm_bindgen(js_name = "slotCatalog")]
pub fn slot_catalog() -> Result<String, JsValue> {
    slot_catalog_json().map_err(|e| JsValue::from_str(&e))
}
