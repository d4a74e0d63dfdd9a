//! # GuildClaw Core
//! Shared kernel — domain records, event kinds, collaborator traits,
//! configuration, and the unified error type.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::GuildclawConfig;
pub use error::{GuildclawError, Result};
pub use traits::{Notifier, RecordStore};
pub use types::{EventKind, Record, Recurrence, Subsystem};
