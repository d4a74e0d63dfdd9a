//! # GuildClaw Scheduler
//! The one piece of real engineering in the bot: hold a set of future
//! timestamped events, sleep until the earliest is due, fire the
//! notifier, and requeue recurring kinds — while any chat command can
//! call `restart` at any moment and atomically supersede the in-flight
//! wait without missing or double-firing events.
//!
//! ## Architecture
//! ```text
//! Scheduler handle (restart / stop)
//!   └── generation N loop (tokio task, CancellationToken)
//!         ├── EventQueue: sorted by due_at, stable ties
//!         ├── sleep-until-due raced against cancellation
//!         ├── Notifier::handle(kind, record)  [bounded timeout]
//!         ├── one-shot → RecordStore::delete on success
//!         └── recurring → recurrence policy → reinsert
//! ```
//!
//! Four independent instances run in the bot (absence, away, birthday,
//! bossing). They share this code and nothing else.

pub mod derive;
pub mod engine;
pub mod queue;
pub mod recurrence;

pub use engine::Scheduler;
pub use queue::{Event, EventQueue};
