//! Human-readable rendering of matched entities: notification blocks for
//! the outbound message and terminal summaries for the run report.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use courtwatch_core::types::{Class, Entity, Tournament};

const START_FORMAT: &str = "%a %d %b, %H:%M %Z";

/// Text rendering for one entity kind.
pub trait Render: Entity {
    /// Block appended to the outbound notification, ending in a blank line.
    /// Times are shown in `tz`.
    fn notification(&self, tz: Tz) -> String;

    /// One-entity summary printed to the terminal.
    fn summary(&self, tz: Tz) -> String;
}

impl Render for Tournament {
    fn notification(&self, _tz: Tz) -> String {
        let mut out = format!("🏆 {}\n", self.name);
        out.push_str(&format!("  Status: {}\n", self.status));
        out.push_str(&format!("  Places: {}\n\n", self.available_slots()));
        out
    }

    fn summary(&self, _tz: Tz) -> String {
        let mut out = format!("{} ({})\n", self.name, self.tournament_id);
        out.push_str(&format!("  Status:     {}\n", self.status));
        if !self.visibility.is_empty() {
            out.push_str(&format!("  Visibility: {}\n", self.visibility));
        }
        out.push_str(&format!("  Places:     {}\n", self.available_slots()));
        let players: Vec<&str> = self.participant_names().collect();
        if !players.is_empty() {
            out.push_str(&format!("  Players:    {}\n", players.join(", ")));
        }
        out
    }
}

impl Render for Class {
    fn notification(&self, tz: Tz) -> String {
        let mut out = format!("🎓 {}\n", self.course_name().unwrap_or("Class"));
        out.push_str(&format!("  Type: {}\n", self.class_type));
        out.push_str(&format!("  Status: {}\n", self.status));
        out.push_str(&format!("  Start: {}\n", format_start(&self.start_date, tz)));
        if let Some(coach) = self.coach_names().next() {
            out.push_str(&format!("  Coach: {coach}\n"));
        }
        out.push_str(&format!("  Registrations: {}\n\n", self.registration_count()));
        out
    }

    fn summary(&self, tz: Tz) -> String {
        let mut out = format!("{} ({})\n", self.display_name(), self.academy_class_id);
        out.push_str(&format!("  Type:          {}\n", self.class_type));
        out.push_str(&format!("  Status:        {}\n", self.status));
        out.push_str(&format!("  Start:         {}\n", format_start(&self.start_date, tz)));
        if !self.resource.name.is_empty() {
            out.push_str(&format!("  Court:         {}\n", self.resource.name));
        }
        let coaches: Vec<&str> = self.coach_names().collect();
        if !coaches.is_empty() {
            out.push_str(&format!("  Coaches:       {}\n", coaches.join(", ")));
        }
        out.push_str(&format!("  Places:        {}\n", self.available_slots()));
        let registrants: Vec<&str> = self.registrant_names().collect();
        out.push_str(&format!("  Registrations: {}", registrants.len()));
        if !registrants.is_empty() {
            out.push_str(&format!(" ({})", registrants.join(", ")));
        }
        out.push('\n');
        if let Some(notes) = self.public_notes.as_deref().filter(|n| !n.trim().is_empty()) {
            out.push_str(&format!("  Notes:         {}\n", notes.trim()));
        }
        out
    }
}

/// Start time in `tz` with its zone abbreviation, or the raw string when it
/// can't be parsed. Accepts RFC 3339 and zone-less `YYYY-MM-DDTHH:MM:SS`,
/// which the booking API uses for UTC.
pub fn format_start(raw: &str, tz: Tz) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|naive| naive.and_utc()));
    match parsed {
        Ok(utc) => utc.with_timezone(&tz).format(START_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
