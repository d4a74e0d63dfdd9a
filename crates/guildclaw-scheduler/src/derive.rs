//! Record → initial events.
//!
//! Every restart takes a snapshot of the subsystem's records and
//! expands it into the events the new generation should wait on. A
//! record that cannot be derived (bad schedule fields, wrong record
//! type for the subsystem) is skipped with a warning; it never aborts
//! the rest of the restart.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use guildclaw_core::types::{EventKind, Record, Subsystem};
use guildclaw_core::{GuildclawError, Result};

use crate::recurrence::{birthday_nominal_clamped, roll_forward_weekly, roll_forward_yearly};

/// Minutes before the run at which party reminders fire.
pub const PARTY_REMINDER_MINUTES: [u32; 5] = [1440, 360, 180, 60, 15];

/// Hours before the run at which check-in opens.
pub const PARTY_CHECK_IN_HOURS: i64 = 48;

/// Hours after the run at which the tracking message is refreshed.
pub const PARTY_UPDATE_HOURS: i64 = 1;

/// Hours a birthday lasts, from its nominal instant.
pub const BIRTHDAY_DURATION_HOURS: i64 = 24;

/// Expand a record snapshot into the initial event batch for a new
/// generation. Derivation failures skip the offending record only.
pub fn derive_events(
    subsystem: Subsystem,
    records: &[Record],
    now: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, EventKind, Arc<Record>)> {
    let mut batch = Vec::new();
    for record in records {
        match derive_record(subsystem, record, now) {
            Ok(events) => {
                let shared = Arc::new(record.clone());
                for (due_at, kind) in events {
                    batch.push((due_at, kind, Arc::clone(&shared)));
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ [{subsystem}] skipping record {}: {e}", record.id());
            }
        }
    }
    batch
}

/// Derive the events for a single record. Pure; returns only the
/// (due, kind) pairs so it stays easy to test.
pub fn derive_record(
    subsystem: Subsystem,
    record: &Record,
    now: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, EventKind)>> {
    match (subsystem, record) {
        (Subsystem::Absence, Record::Absence(r)) => {
            let mut events = Vec::new();
            if r.starts_at > now {
                events.push((r.starts_at, EventKind::AbsenceStart));
            }
            if r.ends_at > now {
                events.push((r.ends_at, EventKind::AbsenceEnd));
            }
            if events.is_empty() {
                tracing::debug!("[absence] record {} already elapsed", r.id);
            }
            Ok(events)
        }

        (Subsystem::Away, Record::Away(r)) => {
            let mut events = Vec::new();
            if r.set_at > now {
                events.push((r.set_at, EventKind::AwaySet));
            }
            if r.clear_at > now {
                events.push((r.clear_at, EventKind::AwayClear));
            }
            Ok(events)
        }

        (Subsystem::Birthday, Record::Birthday(r)) => {
            // Start from last year's nominal instant so a birthday
            // that began within the grace window just before New Year
            // still resolves to "today".
            let nominal = birthday_nominal_clamped(now.year() - 1, r.month, r.day, r.reset_offset_hours)
                .ok_or_else(|| {
                    GuildclawError::derivation(&r.id, format!("invalid date {}-{}", r.month, r.day))
                })?;
            let start = roll_forward_yearly(nominal, now);
            let end = start + Duration::hours(BIRTHDAY_DURATION_HOURS);
            Ok(vec![(start, EventKind::BirthdayStart), (end, EventKind::BirthdayEnd)])
        }

        (Subsystem::Bossing, Record::Party(r)) => {
            let mut events = Vec::new();
            events.push((
                roll_forward_weekly(r.run_at - Duration::hours(PARTY_CHECK_IN_HOURS), now),
                EventKind::PartyCheckIn,
            ));
            for minutes in PARTY_REMINDER_MINUTES {
                // Each offset rolls forward independently: a reminder
                // already unreachable this cycle lands in the next
                // one instead of firing late.
                events.push((
                    roll_forward_weekly(r.run_at - Duration::minutes(minutes as i64), now),
                    EventKind::PartyReminder { minutes_before: minutes },
                ));
            }
            events.push((roll_forward_weekly(r.run_at, now), EventKind::PartyRunStart));
            events.push((
                roll_forward_weekly(r.run_at + Duration::hours(PARTY_UPDATE_HOURS), now),
                EventKind::PartyUpdate,
            ));
            Ok(events)
        }

        (subsystem, other) => Err(GuildclawError::derivation(
            other.id(),
            format!("record does not belong to the {subsystem} subsystem"),
        )),
    }
}
