//! # GuildClaw CLI
//!
//! Guild-management bot core — restartable event scheduling for
//! absences, away statuses, birthdays, and weekly boss runs.
//!
//! Usage:
//!   guildclaw run                      # Start all four schedulers
//!   guildclaw records list             # Show stored records
//!   guildclaw records list birthday    # One subsystem only
//!   guildclaw config show              # Show configuration
//!   guildclaw config reset             # Write defaults

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use guildclaw_core::types::Subsystem;
use guildclaw_core::GuildclawConfig;
use guildclaw_scheduler::Scheduler;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "guildclaw",
    version,
    about = "🦀 GuildClaw — guild-management bot core with restartable scheduling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the schedulers and run until Ctrl+C
    Run,

    /// Inspect stored records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List records, optionally for one subsystem
    List {
        /// absence | away | birthday | bossing
        subsystem: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Reset to defaults
    Reset,
}

fn parse_subsystem(name: &str) -> Result<Subsystem> {
    match name {
        "absence" => Ok(Subsystem::Absence),
        "away" => Ok(Subsystem::Away),
        "birthday" => Ok(Subsystem::Birthday),
        "bossing" => Ok(Subsystem::Bossing),
        other => anyhow::bail!("unknown subsystem: {other} (expected absence|away|birthday|bossing)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "guildclaw=debug,guildclaw_scheduler=debug,guildclaw_store=debug"
    } else {
        "guildclaw=info,guildclaw_scheduler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        GuildclawConfig::load_from(std::path::Path::new(path))?
    } else {
        GuildclawConfig::load()?
    };

    match cli.command {
        Commands::Run => {
            let notifier = guildclaw_notify::create_notifier(&config.notify)?;
            let records_dir = config.records_dir();
            println!("🦀 GuildClaw v{}", env!("CARGO_PKG_VERSION"));
            println!("   Notifier: {} | Records: {}", notifier.name(), records_dir.display());

            let mut schedulers = Vec::new();
            for subsystem in Subsystem::ALL {
                let store = guildclaw_store::create_store(&config.store, &records_dir, subsystem)?;
                let scheduler = Scheduler::new(
                    subsystem,
                    store,
                    Arc::clone(&notifier),
                    &config.scheduler,
                );
                // First restart from the store's initial snapshot.
                scheduler.restart_from_store().await?;
                schedulers.push(scheduler);
            }

            println!("\nSchedulers are running. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await?;

            for scheduler in &schedulers {
                scheduler.stop();
            }
            println!("\n👋 Schedulers stopped.");
        }

        Commands::Records { action } => match action {
            RecordsAction::List { subsystem } => {
                let records_dir = config.records_dir();
                let targets: Vec<Subsystem> = match subsystem {
                    Some(name) => vec![parse_subsystem(&name)?],
                    None => Subsystem::ALL.to_vec(),
                };

                for subsystem in targets {
                    let store =
                        guildclaw_store::create_store(&config.store, &records_dir, subsystem)?;
                    let records = store.list().await?;
                    println!("📋 {subsystem} — {} record(s)", records.len());
                    for record in records {
                        println!("   {} {}", record.id(), record.label());
                    }
                }
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)?;
                println!("{content}");
            }
            ConfigAction::Reset => {
                let config = GuildclawConfig::default();
                config.save()?;
                println!("✅ Configuration reset to defaults at {}", GuildclawConfig::default_path().display());
            }
        },
    }

    Ok(())
}
