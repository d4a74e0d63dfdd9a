//! In-memory record store — tests and dry runs.

use async_trait::async_trait;
use guildclaw_core::types::{Record, Subsystem};
use guildclaw_core::{GuildclawError, RecordStore, Result};
use tokio::sync::RwLock;

/// Volatile store; contents are lost on process exit.
pub struct MemoryStore {
    subsystem: Subsystem,
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new(subsystem: Subsystem) -> Self {
        Self { subsystem, records: RwLock::new(Vec::new()) }
    }

    pub fn with_records(subsystem: Subsystem, records: Vec<Record>) -> Self {
        Self { subsystem, records: RwLock::new(records) }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.clone())
    }

    async fn append(&self, record: Record) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn update(&self, record: Record) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(GuildclawError::NotFound(record.id().to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<Record> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.id() == id) {
            Some(pos) => Ok(records.remove(pos)),
            None => Err(GuildclawError::NotFound(id.to_string())),
        }
    }
}
