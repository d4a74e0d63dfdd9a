//! Domain records — the durable rows the scheduler derives events from.
//!
//! The scheduler never mutates a record; it holds a read-only snapshot
//! taken at restart time. Mutation (append/delete) goes through the
//! `RecordStore` collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member absence window (vacation, exam period, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbsenceRecord {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AbsenceRecord {
    pub fn new(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            member_name: member_name.into(),
            starts_at,
            ends_at,
            reason: None,
        }
    }
}

/// An away-status window — like an absence, but for a short
/// "do not ping me" marker rather than a leave of absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AwayRecord {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub set_at: DateTime<Utc>,
    pub clear_at: DateTime<Utc>,
}

impl AwayRecord {
    pub fn new(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        set_at: DateTime<Utc>,
        clear_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            member_name: member_name.into(),
            set_at,
            clear_at,
        }
    }
}

/// A recurring yearly birthday.
///
/// The nominal instant of a birthday is UTC midnight of `month`/`day`
/// shifted by `reset_offset_hours` — the guild's daily-reset offset —
/// so "birthday starts" lines up with the game day, not the UTC day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BirthdayRecord {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub reset_offset_hours: i64,
}

impl BirthdayRecord {
    pub fn new(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        month: u32,
        day: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            member_name: member_name.into(),
            month,
            day,
            reset_offset_hours: 0,
        }
    }
}

/// A weekly boss-party run, anchored at `run_at`.
///
/// Check-in, reminders, run-start, and the tracking-message update are
/// all derived from the anchor; each recurs weekly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyRecord {
    pub id: String,
    pub name: String,
    pub run_at: DateTime<Utc>,
    /// Chat channel the reminders and the tracking message live in.
    pub channel_id: String,
}

impl PartyRecord {
    pub fn new(name: impl Into<String>, run_at: DateTime<Utc>, channel_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            run_at,
            channel_id: channel_id.into(),
        }
    }
}

/// Any domain record, tagged by subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Absence(AbsenceRecord),
    Away(AwayRecord),
    Birthday(BirthdayRecord),
    Party(PartyRecord),
}

impl Record {
    /// Stable record id, used for store deletes and log lines.
    pub fn id(&self) -> &str {
        match self {
            Record::Absence(r) => &r.id,
            Record::Away(r) => &r.id,
            Record::Birthday(r) => &r.id,
            Record::Party(r) => &r.id,
        }
    }

    /// Human-readable label for log lines.
    pub fn label(&self) -> &str {
        match self {
            Record::Absence(r) => &r.member_name,
            Record::Away(r) => &r.member_name,
            Record::Birthday(r) => &r.member_name,
            Record::Party(r) => &r.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_accessors() {
        let rec = Record::Birthday(BirthdayRecord::new("42", "Mira", 11, 3));
        assert!(!rec.id().is_empty());
        assert_eq!(rec.label(), "Mira");
    }

    #[test]
    fn test_record_json_roundtrip() {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 9, 8, 12, 0, 0).unwrap();
        let rec = Record::Absence(AbsenceRecord::new("42", "Mira", start, end));

        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"type\":\"absence\""));
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
