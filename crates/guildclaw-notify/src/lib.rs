//! # GuildClaw Notify
//! Notifier backends — the observable side effects of event firings.
//! Role grants/revokes and reminder messages go through Discord's
//! REST API; the log backend dry-runs everything through tracing.

pub mod discord;
pub mod log;

use std::sync::Arc;

use guildclaw_core::config::NotifyConfig;
use guildclaw_core::{GuildclawError, Notifier, Result};

/// Create a notifier from configuration.
pub fn create_notifier(config: &NotifyConfig) -> Result<Arc<dyn Notifier>> {
    match config.backend.as_str() {
        "discord" => {
            let discord = config.discord.clone().ok_or_else(|| {
                GuildclawError::NotifierNotConfigured("missing [notify.discord] section".into())
            })?;
            Ok(Arc::new(discord::DiscordNotifier::new(discord)))
        }
        "log" => Ok(Arc::new(log::LogNotifier)),
        other => Err(GuildclawError::Notify(format!("Unknown notifier backend: {other}"))),
    }
}
