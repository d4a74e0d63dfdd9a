//! Shared domain types.

pub mod event;
pub mod record;

pub use event::{EventKind, Recurrence, Subsystem};
pub use record::{AbsenceRecord, AwayRecord, BirthdayRecord, PartyRecord, Record};
