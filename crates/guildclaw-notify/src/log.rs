//! Dry-run notifier — logs what would have happened.

use guildclaw_core::types::{EventKind, Record};
use guildclaw_core::{Notifier, Result};

pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn handle(&self, kind: EventKind, record: &Record) -> Result<()> {
        tracing::info!("🔔 {kind} fired for {} ({})", record.label(), record.id());
        Ok(())
    }
}
