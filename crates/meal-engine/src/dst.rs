//! DST transition policies for meal start times.

use serde::{Deserialize, Serialize};

/// Policy for a wall-clock start that falls in a DST gap
/// (e.g. 02:00 on a spring-forward night).
///
/// Ambiguous times on fall-back nights always resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Read the wall time with the offset in force before the gap, which moves
    /// the start forward by the gap length (02:30 → 03:30).
    #[default]
    ShiftForward,
    /// Refuse to export the event.
    Reject,
}
