//! Configuration — TOML file at `~/.guildclaw/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuildclawError, Result};

/// Top-level GuildClaw configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildclawConfig {
    pub store: StoreConfig,
    pub notify: NotifyConfig,
    pub scheduler: SchedulerConfig,
}

/// Record store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "file" (JSON under the data dir) or "memory".
    pub backend: String,
    /// Override for the records directory; defaults to
    /// `~/.guildclaw/records`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: "file".into(), data_dir: None }
    }
}

/// Notifier backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// "discord" or "log" (dry run).
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { backend: "log".into(), discord: None }
    }
}

/// Discord REST credentials and the ids the notifier targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub guild_id: String,
    /// Channel for birthday wishes and absence announcements.
    pub announce_channel_id: String,
    pub absence_role_id: String,
    pub away_role_id: String,
    pub birthday_role_id: String,
}

/// Scheduler loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on a single notifier callback. The chat and
    /// spreadsheet APIs are network calls and can hang; a timeout is
    /// logged and the loop moves on.
    pub callback_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { callback_timeout_secs: 30 }
    }
}

impl GuildclawConfig {
    /// GuildClaw home directory (`~/.guildclaw`).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guildclaw")
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Directory the file store keeps its JSON records in.
    pub fn records_dir(&self) -> PathBuf {
        self.store
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::home_dir().join("records"))
    }

    /// Load from the default path, falling back to defaults if the
    /// file does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            GuildclawError::ConfigNotFound(path.display().to_string())
        })?;
        toml::from_str(&content).map_err(|e| GuildclawError::Config(format!("parse error: {e}")))
    }

    /// Save to the default path, creating `~/.guildclaw` if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| GuildclawError::Config(format!("serialize error: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuildclawConfig::default();
        assert_eq!(config.store.backend, "file");
        assert_eq!(config.notify.backend, "log");
        assert_eq!(config.scheduler.callback_timeout_secs, 30);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = GuildclawConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: GuildclawConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.store.backend, config.store.backend);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[notify]\nbackend = \"discord\"\n\n[scheduler]\ncallback_timeout_secs = 5\n",
        )
        .unwrap();

        let config = GuildclawConfig::load_from(&path).unwrap();
        assert_eq!(config.notify.backend, "discord");
        assert_eq!(config.scheduler.callback_timeout_secs, 5);
        // Unspecified sections fall back to defaults
        assert_eq!(config.store.backend, "file");
    }

    #[test]
    fn test_load_missing_file() {
        let err = GuildclawConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, GuildclawError::ConfigNotFound(_)));
    }
}
