//! # GuildClaw Store
//! Record store backends. The durable copy of absences, birthdays,
//! and party schedules lives here; the scheduler only ever sees
//! snapshots taken through the `RecordStore` trait.

pub mod file;
pub mod memory;

use std::sync::Arc;

use guildclaw_core::config::StoreConfig;
use guildclaw_core::types::Subsystem;
use guildclaw_core::{GuildclawError, RecordStore, Result};

/// Create a record store for one subsystem from configuration.
pub fn create_store(
    config: &StoreConfig,
    records_dir: &std::path::Path,
    subsystem: Subsystem,
) -> Result<Arc<dyn RecordStore>> {
    match config.backend.as_str() {
        "file" => Ok(Arc::new(file::FileStore::open(records_dir, subsystem)?)),
        "memory" => Ok(Arc::new(memory::MemoryStore::new(subsystem))),
        other => Err(GuildclawError::Store(format!("Unknown store backend: {other}"))),
    }
}
