//! JSON file record store — one file per subsystem under the records
//! directory (`~/.guildclaw/records/<subsystem>.json` by default).
//!
//! Deliberately simple: load-all, mutate, save-all. The row counts
//! here are a guild roster, not a database workload, and a readable
//! JSON file doubles as an inspection surface.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use guildclaw_core::types::{Record, Subsystem};
use guildclaw_core::{GuildclawError, RecordStore, Result};
use tokio::sync::Mutex;

pub struct FileStore {
    subsystem: Subsystem,
    path: PathBuf,
    /// Serializes read-modify-write cycles on the backing file.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open or create the store file for a subsystem.
    pub fn open(records_dir: &Path, subsystem: Subsystem) -> Result<Self> {
        std::fs::create_dir_all(records_dir)?;
        let path = records_dir.join(format!("{subsystem}.json"));
        tracing::debug!("📁 [{subsystem}] record store at {}", path.display());
        Ok(Self { subsystem, path, lock: Mutex::new(()) })
    }

    fn load_all(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            GuildclawError::Store(format!("corrupt store file {}: {e}", self.path.display()))
        })
    }

    fn save_all(&self, records: &[Record]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    async fn list(&self) -> Result<Vec<Record>> {
        let _guard = self.lock.lock().await;
        self.load_all()
    }

    async fn append(&self, record: Record) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_all()?;
        records.push(record);
        self.save_all(&records)
    }

    async fn update(&self, record: Record) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_all()?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Err(GuildclawError::NotFound(record.id().to_string()));
        };
        *slot = record;
        self.save_all(&records)
    }

    async fn delete(&self, id: &str) -> Result<Record> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_all()?;
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Err(GuildclawError::NotFound(id.to_string()));
        };
        let removed = records.remove(pos);
        self.save_all(&records)?;
        Ok(removed)
    }
}
