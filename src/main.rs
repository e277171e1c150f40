//! # CourtWatch CLI
//!
//! Polls Playtomic for tournaments and academy classes that match the
//! configured filters and notifies when something new opens up.
//!
//! Usage:
//!   courtwatch tournaments              # One cycle over tournament filters
//!   courtwatch classes                  # One cycle over class filters
//!   courtwatch all                      # Both, one combined notification
//!   courtwatch config show              # Show configuration (secrets masked)
//!   courtwatch state show classes       # List stored observations

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use courtwatch_channels::create_channel;
use courtwatch_client::PlaytomicClient;
use courtwatch_core::WatchConfig;
use courtwatch_core::types::{Class, EntityKind, Tournament};
use courtwatch_watch::{ObservationStore, Render, Run};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "courtwatch",
    version,
    about = "🎾 CourtWatch: get told when padel tournaments and classes open up",
    long_about = "Polls Playtomic for tournaments and academy classes matching your filters.\nRun it from cron; it only notifies about new entries or ones with more free places."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overall deadline for one cycle, in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Telegram bot token (overrides config and TELEGRAM_BOT_TOKEN)
    #[arg(long, global = true)]
    telegram_token: Option<String>,

    /// Telegram chat id (overrides config and TELEGRAM_CHAT_ID)
    #[arg(long, global = true)]
    telegram_chat_id: Option<String>,

    /// Tournament state file
    #[arg(long, global = true)]
    tournament_state: Option<String>,

    /// Class state file
    #[arg(long, global = true)]
    class_state: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check tournaments once
    Tournaments,

    /// Check academy classes once
    Classes,

    /// Check tournaments and classes in one cycle
    All,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Inspect stored observations
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show resolved configuration
    Show,
}

#[derive(Subcommand)]
enum StateAction {
    /// List stored observations for one kind
    Show {
        #[arg(value_enum)]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Tournaments,
    Classes,
}

impl From<KindArg> for EntityKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Tournaments => EntityKind::Tournament,
            KindArg::Classes => EntityKind::Class,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the result listing.
    let filter = if cli.verbose { "warn,courtwatch=debug" } else { "warn,courtwatch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Tournaments => run_cycle(&config, &[EntityKind::Tournament]).await,
        Commands::Classes => run_cycle(&config, &[EntityKind::Class]).await,
        Commands::All => run_cycle(&config, &[EntityKind::Tournament, EntityKind::Class]).await,
        Commands::Config { action: ConfigAction::Show } => {
            print!("{}", config.to_masked_toml()?);
            Ok(())
        }
        Commands::State { action: StateAction::Show { kind } } => show_state(&config, kind.into()),
    }
}

/// File, then environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<WatchConfig> {
    let mut config = WatchConfig::load_from(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    config.apply_env_overrides();
    config.set_telegram(cli.telegram_token.clone(), cli.telegram_chat_id.clone());
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    if let Some(path) = &cli.tournament_state {
        config.state.tournament_file = path.clone();
    }
    if let Some(path) = &cli.class_state {
        config.state.class_file = path.clone();
    }
    Ok(config)
}

async fn run_cycle(config: &WatchConfig, kinds: &[EntityKind]) -> Result<()> {
    // Load every store up front: a corrupt state file aborts before any
    // request is made.
    let mut stores = Vec::new();
    for &kind in kinds {
        if config.rule_count(kind) == 0 {
            if kinds.len() == 1 {
                bail!("no {} filters configured in the config file", kind);
            }
            tracing::warn!(%kind, "No filters configured, skipping");
            continue;
        }
        let path = config.state.path_for(kind);
        let store = ObservationStore::load(&path)
            .with_context(|| format!("loading {kind} state from {}", path.display()))?;
        stores.push((kind, store));
    }

    let client = PlaytomicClient::new(&config.api, config.timeout())?;
    let channel = create_channel(config);
    let mut run = Run::new(config.timeout()).with_timezone(config.timezone);

    for (kind, store) in &mut stores {
        match kind {
            EntityKind::Tournament => {
                let matched = run.sweep::<Tournament, _>(&client, &config.tournaments, store).await;
                print_matches(*kind, &matched, config.timezone);
            }
            EntityKind::Class => {
                let matched = run.sweep::<Class, _>(&client, &config.classes, store).await;
                print_matches(*kind, &matched, config.timezone);
            }
        }
    }

    if run.timed_out() {
        tracing::warn!(timeout_secs = config.timeout_secs, "Cycle deadline exceeded, results are partial");
    }
    run.dispatch(channel.as_deref()).await;

    for (kind, store) in &mut stores {
        if let Err(e) = store.save() {
            tracing::error!(%kind, error = %e, "Failed to save state");
        }
    }
    Ok(())
}

fn print_matches<E: Render>(kind: EntityKind, matched: &[E], tz: Tz) {
    if matched.is_empty() {
        println!("No matching {} found.", kind.plural());
        return;
    }
    println!("Found {} matching {}:\n", matched.len(), kind.plural());
    for entity in matched {
        println!("{}", entity.summary(tz));
    }
}

fn show_state(config: &WatchConfig, kind: EntityKind) -> Result<()> {
    let path = config.state.path_for(kind);
    let store = ObservationStore::load(&path)
        .with_context(|| format!("loading {kind} state from {}", path.display()))?;

    if store.is_empty() {
        println!("No {} recorded in {}", kind.plural(), path.display());
        return Ok(());
    }
    println!("{} {} in {}:\n", store.len(), kind.plural(), path.display());
    for (id, observation) in store.iter() {
        println!(
            "  {id:<40} last seen {}  places {}",
            observation.last_seen.format("%Y-%m-%d %H:%M UTC"),
            observation.available_places
        );
    }
    Ok(())
}
