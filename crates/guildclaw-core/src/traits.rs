//! Collaborator traits the scheduler calls into.
//!
//! The spreadsheet/chat layers live behind these two traits; the
//! scheduler crate knows nothing about Google Sheets or Discord.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EventKind, Record, Subsystem};

/// Durable record storage for one subsystem.
///
/// `list` is called once per scheduler restart to take a snapshot;
/// `delete` is called by the loop after a one-shot event fires.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn subsystem(&self) -> Subsystem;

    /// Current records, as an owned snapshot.
    async fn list(&self) -> Result<Vec<Record>>;

    async fn append(&self, record: Record) -> Result<()>;

    async fn update(&self, record: Record) -> Result<()>;

    /// Remove a record by id. Returns the removed record, or
    /// `GuildclawError::NotFound` if no record has that id.
    async fn delete(&self, id: &str) -> Result<Record>;
}

/// Performs the observable side effect when an event fires — grant or
/// revoke a status role, send a reminder, refresh a tracking message.
///
/// Within one subsystem loop `handle` is invoked at most once per
/// event firing and never concurrently with itself.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, kind: EventKind, record: &Record) -> Result<()>;
}
