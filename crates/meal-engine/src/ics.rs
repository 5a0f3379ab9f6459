//! Meal event → `.ics` calendar document.
//!
//! Renders one VEVENT with a single display alarm inside a VCALENDAR
//! container. Output is deterministic: the same event, zone and resolver
//! always produce the same bytes (no DTSTAMP, no generated UID).
//!
//! ```text
//! BEGIN:VCALENDAR
//! VERSION:2.0
//! PRODID:-//Menu Match//Meal Scheduler//EN
//! CALSCALE:GREGORIAN
//! METHOD:PUBLISH
//! BEGIN:VEVENT
//! DTSTART:20251022T190000Z
//! DTEND:20251022T210000Z
//! SUMMARY:Meal at The Blue Door
//! DESCRIPTION:Meal with Alex Kim at The Blue Door
//! LOCATION:The Blue Door
//! STATUS:CONFIRMED
//! SEQUENCE:0
//! BEGIN:VALARM
//! TRIGGER:-PT1H
//! DESCRIPTION:Reminder: Meal at The Blue Door in 1 hour
//! ACTION:DISPLAY
//! END:VALARM
//! END:VEVENT
//! END:VCALENDAR
//! ```
//!
//! Two output modes exist. [`EscapeMode::Rfc5545`] escapes TEXT values, folds
//! long lines and terminates every line with CRLF. [`EscapeMode::Verbatim`]
//! reproduces the planner's historical output exactly: raw values, LF
//! separators and no trailing newline. Verbatim output breaks when a value
//! contains a newline, so it is only meant for byte-level parity.

use chrono::{
    DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dst::DstPolicy;
use crate::error::{MealError, Result};
use crate::event::MealEvent;
use crate::roster::NameResolver;
use crate::slot::TimeSlot;

/// Media type of the exported document.
pub const MEDIA_TYPE: &str = "text/calendar";

pub const DEFAULT_PRODUCT_ID: &str = "-//Menu Match//Meal Scheduler//EN";

const MEAL_LENGTH_HOURS: i64 = 2;
const FOLD_OCTETS: usize = 75;

/// How property values and line breaks are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// RFC 5545 TEXT escaping, 75-octet line folding, CRLF line endings.
    #[default]
    Rfc5545,
    /// Unescaped values joined with LF, byte-identical to the planner's
    /// original export.
    Verbatim,
}

/// A rendered calendar document and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedCalendar {
    pub document: String,
    pub filename: String,
}

impl ExportedCalendar {
    pub fn media_type(&self) -> &'static str {
        MEDIA_TYPE
    }
}

/// Renders [`MealEvent`]s as calendar documents.
///
/// The event's date and hour are wall-clock values in `zone`; the document
/// carries UTC timestamps.
#[derive(Debug, Clone)]
pub struct EventExporter<Z: TimeZone> {
    zone: Z,
    escape: EscapeMode,
    dst_policy: DstPolicy,
    product_id: String,
}

impl EventExporter<Local> {
    /// Exporter for the machine's local timezone.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for EventExporter<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Z: TimeZone> EventExporter<Z> {
    pub fn new(zone: Z) -> Self {
        Self {
            zone,
            escape: EscapeMode::default(),
            dst_policy: DstPolicy::default(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
        }
    }

    pub fn with_escape(mut self, escape: EscapeMode) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn escape_mode(&self) -> EscapeMode {
        self.escape
    }

    /// Render `event` into a calendar document and its filename.
    ///
    /// Participants that `resolver` cannot name are left out of the
    /// description; if none can be named the description says "friends".
    ///
    /// # Errors
    /// - `MealError::InvalidHour` if the event hour is outside `0..=23`.
    /// - `MealError::NonexistentLocalTime` if the start falls in a DST gap and
    ///   the policy is [`DstPolicy::Reject`].
    /// - `MealError::OutOfRange` if the start or end cannot be represented.
    pub fn export<R>(&self, event: &MealEvent, resolver: &R) -> Result<ExportedCalendar>
    where
        R: NameResolver + ?Sized,
    {
        let start = self.start_instant(event.date(), event.hour())?;
        let end = start
            .checked_add_signed(Duration::hours(MEAL_LENGTH_HOURS))
            .ok_or_else(|| MealError::OutOfRange(format!("end of meal starting {}", start)))?;

        let names: Vec<String> = event
            .participants()
            .iter()
            .filter_map(|&id| {
                let name = resolver.display_name(id);
                if name.is_none() {
                    debug!(participant = id, "no display name; leaving out of description");
                }
                name
            })
            .collect();
        let company = if names.is_empty() {
            "friends".to_string()
        } else {
            names.join(", ")
        };
        let restaurant = event.restaurant();

        let mut doc = Document::new(self.escape);
        doc.property("BEGIN", "VCALENDAR");
        doc.property("VERSION", "2.0");
        doc.property("PRODID", &self.product_id);
        doc.property("CALSCALE", "GREGORIAN");
        doc.property("METHOD", "PUBLISH");
        doc.property("BEGIN", "VEVENT");
        doc.property("DTSTART", &utc_stamp(&start));
        doc.property("DTEND", &utc_stamp(&end));
        doc.text("SUMMARY", &format!("Meal at {}", restaurant));
        doc.text("DESCRIPTION", &format!("Meal with {} at {}", company, restaurant));
        doc.text("LOCATION", restaurant);
        doc.property("STATUS", "CONFIRMED");
        doc.property("SEQUENCE", "0");
        doc.property("BEGIN", "VALARM");
        doc.property("TRIGGER", "-PT1H");
        doc.text("DESCRIPTION", &format!("Reminder: Meal at {} in 1 hour", restaurant));
        doc.property("ACTION", "DISPLAY");
        doc.property("END", "VALARM");
        doc.property("END", "VEVENT");
        doc.property("END", "VCALENDAR");

        let filename = filename_for(event);
        debug!(event_id = %event.id(), %filename, mode = ?self.escape, "exported meal event");

        Ok(ExportedCalendar {
            document: doc.finish(),
            filename,
        })
    }

    /// UTC instant of `hour:00` on `date` in the exporter's zone.
    fn start_instant(&self, date: NaiveDate, hour: TimeSlot) -> Result<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or(MealError::InvalidHour(hour))?;
        let local = date.and_time(time);

        if let Some(start) = self.zone.from_local_datetime(&local).earliest() {
            return Ok(start.with_timezone(&Utc));
        }

        match self.dst_policy {
            DstPolicy::Reject => Err(MealError::NonexistentLocalTime { date, hour }),
            DstPolicy::ShiftForward => {
                let shifted = self.before_gap(local)?;
                debug!(%local, %shifted, "start falls in a DST gap; shifted forward");
                Ok(shifted)
            }
        }
    }

    /// Interpret `local` with the offset in force a day earlier, i.e. before
    /// the transition that created the gap.
    fn before_gap(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        let out_of_range = || MealError::OutOfRange(local.to_string());
        let day_before = local
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        let offset = self
            .zone
            .offset_from_local_datetime(&day_before)
            .earliest()
            .ok_or_else(out_of_range)?
            .fix();
        let utc = local
            .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
            .ok_or_else(out_of_range)?;
        Ok(Utc.from_utc_datetime(&utc))
    }
}

/// Filename for an exported event: `meal-<restaurant>-<YYYY-MM-DD>.ics`.
///
/// Whitespace runs in the restaurant name become single hyphens (leading and
/// trailing whitespace is dropped). Path separators, characters reserved on
/// common filesystems, and control characters also become hyphens. The event
/// id plays no part, so two meals at one place on one day share a name.
pub fn filename_for(event: &MealEvent) -> String {
    let label: Vec<String> = event
        .restaurant()
        .split_whitespace()
        .map(|word| word.chars().map(filename_char).collect())
        .collect();
    format!(
        "meal-{}-{}.ics",
        label.join("-"),
        event.date().format("%Y-%m-%d")
    )
}

fn filename_char(c: char) -> char {
    match c {
        '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
        c if c.is_control() => '-',
        c => c,
    }
}

/// Basic-format UTC timestamp, e.g. `20251022T190000Z`.
fn utc_stamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Accumulates content lines and applies the output mode on `finish`.
struct Document {
    mode: EscapeMode,
    lines: Vec<String>,
}

impl Document {
    fn new(mode: EscapeMode) -> Self {
        Self {
            mode,
            lines: Vec::with_capacity(20),
        }
    }

    /// A property whose value is emitted as-is in every mode.
    fn property(&mut self, name: &str, value: &str) {
        self.lines.push(format!("{}:{}", name, value));
    }

    /// A TEXT property, escaped in RFC 5545 mode.
    fn text(&mut self, name: &str, value: &str) {
        match self.mode {
            EscapeMode::Rfc5545 => self.property(name, &escape_text(value)),
            EscapeMode::Verbatim => self.property(name, value),
        }
    }

    fn finish(self) -> String {
        match self.mode {
            EscapeMode::Verbatim => self.lines.join("\n"),
            EscapeMode::Rfc5545 => {
                let mut out = String::new();
                for line in &self.lines {
                    fold_line(line, &mut out);
                }
                out
            }
        }
    }
}

/// Escape a TEXT value: backslash, semicolon, comma and line breaks.
/// CRLF, lone CR and LF each become one `\n`.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            c => out.push(c),
        }
    }
    out
}

/// Append `line` folded to 75 octets per physical line, CRLF terminated.
/// Continuation lines start with one space, which counts toward the limit.
/// Never splits a UTF-8 sequence.
fn fold_line(line: &str, out: &mut String) {
    let mut limit = FOLD_OCTETS;
    let mut start = 0;
    let mut width = 0;
    for (i, c) in line.char_indices() {
        let len = c.len_utf8();
        if width + len > limit {
            out.push_str(&line[start..i]);
            out.push_str("\r\n ");
            start = i;
            width = 0;
            limit = FOLD_OCTETS - 1;
        }
        width += len;
    }
    out.push_str(&line[start..]);
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_handles_structural_characters() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn escape_text_keeps_lone_carriage_return_as_break() {
        assert_eq!(escape_text("Fish\rChips"), "Fish\\nChips");
        assert_eq!(escape_text("a\r\r\nb"), "a\\n\\nb");
    }

    #[test]
    fn short_lines_are_not_folded() {
        let mut out = String::new();
        fold_line("SUMMARY:Meal at Cafe", &mut out);
        assert_eq!(out, "SUMMARY:Meal at Cafe\r\n");
    }

    #[test]
    fn long_lines_fold_at_75_octets() {
        let line = format!("DESCRIPTION:{}", "x".repeat(200));
        let mut out = String::new();
        fold_line(&line, &mut out);

        let physical: Vec<&str> = out.trim_end_matches("\r\n").split("\r\n").collect();
        assert!(physical.len() > 1);
        assert_eq!(physical[0].len(), 75);
        for cont in &physical[1..] {
            assert!(cont.starts_with(' '));
            assert!(cont.len() <= 75);
        }
        let unfolded: String = physical
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { *l } else { &l[1..] })
            .collect();
        assert_eq!(unfolded, line);
    }

    #[test]
    fn folding_keeps_multibyte_characters_whole() {
        let line = format!("LOCATION:{}", "é".repeat(60));
        let mut out = String::new();
        fold_line(&line, &mut out);
        for physical in out.split("\r\n") {
            assert!(physical.len() <= 75);
        }
        assert_eq!(out.replace("\r\n ", "").trim_end(), line);
    }

    #[test]
    fn filename_replaces_path_separators() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
        let event = MealEvent::new(date, 12, " Fish/Chips  Co ", vec![]);
        assert_eq!(filename_for(&event), "meal-Fish-Chips-Co-2025-10-22.ics");
    }
}
