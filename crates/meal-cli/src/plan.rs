//! The TOML plan file: roster, the user's availability, and peer availability.
//!
//! ```toml
//! timezone = "America/Los_Angeles"   # optional; machine local time if absent
//! escape = "rfc5545"                 # or "verbatim"
//! self_id = 0
//!
//! [[people]]
//! id = 1
//! name = "Alex Kim"
//! tag = "blue"
//!
//! [[availability]]
//! date = "2025-10-22"
//! slots = [12, 13, 18, 19, 20]
//!
//! [[peers]]
//! person = 1
//! date = "2025-10-22"
//! slots = [12, 13, 14, 18, 19, 20]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use meal_engine::{
    Availability, AvailabilityStore, EscapeMode, PeerTable, Person, PersonId, Roster, TimeSlot,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlanFile {
    /// IANA timezone used for exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub escape: EscapeMode,

    /// Overrides the PRODID written into exported documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Id of the user who owns `availability`.
    #[serde(default)]
    pub self_id: PersonId,

    #[serde(default)]
    pub people: Vec<Person>,

    /// The user's own free slots.
    #[serde(default)]
    pub availability: Vec<Availability>,

    /// Everyone else's free slots. Read only.
    #[serde(default)]
    pub peers: Vec<PeerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    pub person: PersonId,
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

impl PlanFile {
    /// Load a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Plan file not found at {}\n\n\
                Create one with your roster and availability:\n\n\
                self_id = 0\n\n\
                [[people]]\n\
                id = 1\n\
                name = \"Alex Kim\"\n\n\
                [[peers]]\n\
                person = 1\n\
                date = \"2025-10-22\"\n\
                slots = [18, 19, 20]",
                path.display()
            );
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
        let plan: PlanFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse plan file: {}", path.display()))?;
        debug!(
            path = %path.display(),
            people = plan.people.len(),
            own_dates = plan.availability.len(),
            peer_records = plan.peers.len(),
            "loaded plan"
        );
        Ok(plan)
    }

    /// Load a plan file, or start an empty plan if it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize plan")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write plan file: {}", path.display()))
    }

    pub fn roster(&self) -> Roster {
        Roster::from(self.people.clone())
    }

    pub fn peer_table(&self) -> PeerTable {
        self.peers
            .iter()
            .map(|record| {
                (
                    record.person,
                    Availability::new(record.date, record.slots.iter().copied()),
                )
            })
            .collect()
    }

    pub fn store(&self) -> AvailabilityStore<PeerTable> {
        AvailabilityStore::from_records(
            self.self_id,
            self.availability.iter().cloned(),
            self.peer_table(),
        )
    }
}
