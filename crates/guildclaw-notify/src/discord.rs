//! Discord REST notifier.
//!
//! Pure REST — no gateway socket. The scheduler only ever pushes:
//! role grants/revokes for status markers and messages for reminders
//! and birthday wishes. Incoming chat commands are handled elsewhere.

use guildclaw_core::config::DiscordConfig;
use guildclaw_core::types::{EventKind, Record};
use guildclaw_core::{GuildclawError, Notifier, Result};

const API_BASE: &str = "https://discord.com/api/v10";

pub struct DiscordNotifier {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Self {
        let client = reqwest::Client::builder()
            .default_headers({
                let mut h = reqwest::header::HeaderMap::new();
                if let Ok(auth) = format!("Bot {}", config.bot_token).parse() {
                    h.insert("Authorization", auth);
                }
                if let Ok(agent) = "GuildClaw/0.3".parse() {
                    h.insert("User-Agent", agent);
                }
                h
            })
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Post a message to a channel.
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let url = format!("{API_BASE}/channels/{channel_id}/messages");
        let body = serde_json::json!({ "content": content });

        let response = self.client.post(&url).json(&body).send().await
            .map_err(|e| GuildclawError::Notify(format!("Discord send failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GuildclawError::Notify(format!("Discord {status}: {text}")));
        }
        Ok(())
    }

    /// Grant or revoke a role on a guild member.
    async fn set_role(&self, member_id: &str, role_id: &str, grant: bool) -> Result<()> {
        let url = format!(
            "{API_BASE}/guilds/{}/members/{member_id}/roles/{role_id}",
            self.config.guild_id
        );
        let request = if grant { self.client.put(&url) } else { self.client.delete(&url) };

        let response = request.send().await
            .map_err(|e| GuildclawError::Notify(format!("Discord role change failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GuildclawError::Notify(format!("Discord {status}: {text}")));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn handle(&self, kind: EventKind, record: &Record) -> Result<()> {
        match (kind, record) {
            (EventKind::AbsenceStart, Record::Absence(r)) => {
                self.set_role(&r.member_id, &self.config.absence_role_id, true).await?;
                let note = match &r.reason {
                    Some(reason) => format!("📋 {} is now absent ({reason})", r.member_name),
                    None => format!("📋 {} is now absent", r.member_name),
                };
                self.send_message(&self.config.announce_channel_id, &note).await
            }
            (EventKind::AbsenceEnd, Record::Absence(r)) => {
                self.set_role(&r.member_id, &self.config.absence_role_id, false).await
            }

            (EventKind::AwaySet, Record::Away(r)) => {
                self.set_role(&r.member_id, &self.config.away_role_id, true).await
            }
            (EventKind::AwayClear, Record::Away(r)) => {
                self.set_role(&r.member_id, &self.config.away_role_id, false).await
            }

            (EventKind::BirthdayStart, Record::Birthday(r)) => {
                self.set_role(&r.member_id, &self.config.birthday_role_id, true).await?;
                self.send_message(
                    &self.config.announce_channel_id,
                    &format!("🎂 Happy birthday, <@{}>!", r.member_id),
                )
                .await
            }
            (EventKind::BirthdayEnd, Record::Birthday(r)) => {
                self.set_role(&r.member_id, &self.config.birthday_role_id, false).await
            }

            (EventKind::PartyCheckIn, Record::Party(r)) => {
                self.send_message(
                    &r.channel_id,
                    &format!("🗓️ Check-in is open for **{}** — react to claim your spot!", r.name),
                )
                .await
            }
            (EventKind::PartyReminder { minutes_before }, Record::Party(r)) => {
                self.send_message(
                    &r.channel_id,
                    &format!("⏰ **{}** runs in {}!", r.name, format_lead(minutes_before)),
                )
                .await
            }
            (EventKind::PartyRunStart, Record::Party(r)) => {
                self.send_message(&r.channel_id, &format!("⚔️ **{}** is starting now!", r.name))
                    .await
            }
            (EventKind::PartyUpdate, Record::Party(r)) => {
                self.send_message(
                    &r.channel_id,
                    &format!("📊 Weekly tracker for **{}** has rolled over.", r.name),
                )
                .await
            }

            (kind, record) => Err(GuildclawError::Notify(format!(
                "no Discord handler for {kind} on record {}",
                record.id()
            ))),
        }
    }
}

fn format_lead(minutes: u32) -> String {
    if minutes % 60 == 0 {
        let hours = minutes / 60;
        if hours == 1 { "1 hour".into() } else { format!("{hours} hours") }
    } else {
        format!("{minutes} minutes")
    }
}
