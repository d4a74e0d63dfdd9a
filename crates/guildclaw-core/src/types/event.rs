//! Event kinds and subsystem tags.

use serde::{Deserialize, Serialize};

/// The four independent scheduler subsystems. Each owns its own
/// record store, notifier, and scheduler generation; they share code
/// but no state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Absence,
    Away,
    Birthday,
    Bossing,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Absence,
        Subsystem::Away,
        Subsystem::Birthday,
        Subsystem::Bossing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Absence => "absence",
            Subsystem::Away => "away",
            Subsystem::Birthday => "birthday",
            Subsystem::Bossing => "bossing",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a recurring event kind derives its next occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Same calendar date next year (Feb 29 clamps to Feb 28).
    Yearly,
    /// Exactly 7 days later, with catch-up across missed intervals.
    Weekly,
}

/// What an event firing means. One-shot kinds consume their backing
/// record; recurring kinds are reinserted with a recomputed due time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    // One-shot
    AbsenceStart,
    AbsenceEnd,
    AwaySet,
    AwayClear,
    // Recurring yearly
    BirthdayStart,
    BirthdayEnd,
    // Recurring weekly
    PartyCheckIn,
    PartyReminder { minutes_before: u32 },
    PartyRunStart,
    PartyUpdate,
}

impl EventKind {
    /// Recurrence rule, or None for one-shot kinds.
    pub fn recurrence(&self) -> Option<Recurrence> {
        match self {
            EventKind::AbsenceStart
            | EventKind::AbsenceEnd
            | EventKind::AwaySet
            | EventKind::AwayClear => None,
            EventKind::BirthdayStart | EventKind::BirthdayEnd => Some(Recurrence::Yearly),
            EventKind::PartyCheckIn
            | EventKind::PartyReminder { .. }
            | EventKind::PartyRunStart
            | EventKind::PartyUpdate => Some(Recurrence::Weekly),
        }
    }

    pub fn is_one_shot(&self) -> bool {
        self.recurrence().is_none()
    }

    /// Whether firing this kind consumes the backing record. Only the
    /// closing edge of a one-shot window does: the record must outlive
    /// its start edge so a restart mid-window still derives the end.
    pub fn consumes_record(&self) -> bool {
        matches!(self, EventKind::AbsenceEnd | EventKind::AwayClear)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::AbsenceStart => write!(f, "absence_start"),
            EventKind::AbsenceEnd => write!(f, "absence_end"),
            EventKind::AwaySet => write!(f, "away_set"),
            EventKind::AwayClear => write!(f, "away_clear"),
            EventKind::BirthdayStart => write!(f, "birthday_start"),
            EventKind::BirthdayEnd => write!(f, "birthday_end"),
            EventKind::PartyCheckIn => write!(f, "party_check_in"),
            EventKind::PartyReminder { minutes_before } => {
                write!(f, "party_reminder_{minutes_before}m")
            }
            EventKind::PartyRunStart => write!(f, "party_run_start"),
            EventKind::PartyUpdate => write!(f, "party_update"),
        }
    }
}
