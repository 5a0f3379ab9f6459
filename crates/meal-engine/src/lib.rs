//! # meal-engine
//!
//! Common-availability computation and calendar export for meal planning.
//!
//! Each person declares, per calendar date, the hourly slots they are free.
//! The engine intersects the user's own slots with those of a selected group
//! of peers, and renders a committed meal into an RFC 5545 shaped `.ics`
//! document with a one-hour reminder alarm.
//!
//! ## Modules
//!
//! - [`slot`] — Hour-of-day slot vocabulary and the fixed slot catalog
//! - [`availability`] — Self-owned availability store and the intersection algorithm
//! - [`directory`] — Concurrent multi-user availability directory
//! - [`roster`] — People and participant name resolution
//! - [`event`] — Meal event records with process-unique ids
//! - [`planner`] — Participant selection and event commits on top of the store
//! - [`ics`] — Meal event → `.ics` document and filename
//! - [`dst`] — Policies for local times that fall in a DST gap
//! - [`error`] — Error types
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use meal_engine::{AvailabilityStore, EventExporter, MealEvent, PeerTable, Roster, Person};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
//!
//! let mut peers = PeerTable::new();
//! peers.insert(1, date, [18, 19, 20]);
//!
//! let mut store = AvailabilityStore::new(0, peers);
//! for hour in [12, 18, 19] {
//!     store.toggle_slot(date, hour);
//! }
//! assert_eq!(store.common_slots(date, &[1]), vec![18, 19]);
//!
//! let roster = Roster::from(vec![Person::new(1, "Alex Kim", "blue")]);
//! let event = MealEvent::new(date, 19, "The Blue Door", vec![1]);
//! let export = EventExporter::new(chrono::Utc).export(&event, &roster).unwrap();
//! assert_eq!(export.filename, "meal-The-Blue-Door-2025-10-22.ics");
//! assert!(export.document.contains("DTSTART:20251022T190000Z"));
//! ```

pub mod availability;
pub mod directory;
pub mod dst;
pub mod error;
pub mod event;
pub mod ics;
pub mod planner;
pub mod roster;
pub mod slot;

pub use availability::{Availability, AvailabilityStore, PeerAvailability, PeerTable};
pub use directory::AvailabilityDirectory;
pub use dst::DstPolicy;
pub use error::{MealError, Result};
pub use event::{EventId, MealEvent};
pub use ics::{EscapeMode, EventExporter, ExportedCalendar, MEDIA_TYPE};
pub use planner::MealPlanner;
pub use roster::{NameResolver, Person, PersonId, Roster};
pub use slot::{catalog, parse_date, parse_timezone, slot_label, TimeSlot};
