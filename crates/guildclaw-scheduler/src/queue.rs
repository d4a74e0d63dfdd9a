//! Event queue — pending events for one scheduler generation.
//!
//! Kept sorted ascending by due time with stable ties, so the loop
//! only ever looks at the front. The queue is private to one
//! generation of one loop; it is rebuilt wholesale on every restart
//! and never merged with a predecessor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use guildclaw_core::types::{EventKind, Record};
use guildclaw_core::{GuildclawError, Result};

/// A single timestamped unit of future work.
#[derive(Debug, Clone)]
pub struct Event {
    pub due_at: DateTime<Utc>,
    pub kind: EventKind,
    /// Shared reference into the generation's record snapshot; the
    /// scheduler never copies or mutates the record itself.
    pub record: Arc<Record>,
    /// Insertion counter, breaks due-time ties.
    seq: u64,
}

/// Ordered collection of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh queue from an initial batch. Used on every
    /// restart so no ordering from a prior generation survives.
    pub fn rebuild(batch: Vec<(DateTime<Utc>, EventKind, Arc<Record>)>) -> Self {
        let mut queue = Self::new();
        for (due_at, kind, record) in batch {
            queue.insert(due_at, kind, record);
        }
        queue
    }

    /// Insert preserving ascending due-time order; equal due times
    /// keep insertion order. O(n), fine for the tens-to-hundreds of
    /// events a guild produces.
    pub fn insert(&mut self, due_at: DateTime<Utc>, kind: EventKind, record: Arc<Record>) {
        let event = Event { due_at, kind, record, seq: self.next_seq };
        self.next_seq += 1;
        let pos = self.events.partition_point(|e| e.due_at <= due_at);
        self.events.insert(pos, event);
    }

    /// Soonest event, without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Remove and return the soonest event.
    pub fn pop(&mut self) -> Result<Event> {
        if self.events.is_empty() {
            return Err(GuildclawError::EmptyQueue);
        }
        Ok(self.events.remove(0))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use guildclaw_core::types::BirthdayRecord;

    fn record() -> Arc<Record> {
        Arc::new(Record::Birthday(BirthdayRecord::new("1", "Mira", 11, 3)))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_pop_in_due_order() {
        let mut queue = EventQueue::new();
        queue.insert(at(30), EventKind::BirthdayEnd, record());
        queue.insert(at(10), EventKind::BirthdayStart, record());
        queue.insert(at(20), EventKind::PartyRunStart, record());

        assert_eq!(queue.pop().unwrap().due_at, at(10));
        assert_eq!(queue.pop().unwrap().due_at, at(20));
        assert_eq!(queue.pop().unwrap().due_at, at(30));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut queue = EventQueue::new();
        queue.insert(at(10), EventKind::AbsenceStart, record());
        queue.insert(at(10), EventKind::AbsenceEnd, record());
        queue.insert(at(10), EventKind::AwaySet, record());

        assert_eq!(queue.pop().unwrap().kind, EventKind::AbsenceStart);
        assert_eq!(queue.pop().unwrap().kind, EventKind::AbsenceEnd);
        assert_eq!(queue.pop().unwrap().kind, EventKind::AwaySet);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut queue = EventQueue::new();
        queue.insert(at(5), EventKind::AwaySet, record());
        assert_eq!(queue.peek().unwrap().due_at, at(5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_empty_errors() {
        let mut queue = EventQueue::new();
        assert!(matches!(queue.pop(), Err(GuildclawError::EmptyQueue)));
    }

    #[test]
    fn test_rebuild_sorts() {
        let queue = EventQueue::rebuild(vec![
            (at(300), EventKind::PartyUpdate, record()),
            (at(100), EventKind::PartyCheckIn, record()),
            (at(200), EventKind::PartyRunStart, record()),
        ]);
        assert_eq!(queue.peek().unwrap().due_at, at(100));
        assert_eq!(queue.len(), 3);
    }
}
