//! Prediction engine admin CLI
//!
//! Usage:
//!   predictor_cli replay --feed data/feed.jsonl
//!   predictor_cli replay --feed data/feed.jsonl --dry-run
//!   predictor_cli stats
//!   predictor_cli status --recent 20
//!   predictor_cli reset
//!   predictor_cli prune --days 30

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use predictor::config::Config;
use predictor::engine::{EngineSettings, PredictionStatus};
use predictor::relay::{PredictionService, Relay};
use predictor::storage::{JsonStateStore, MemoryStateStore, StateStore};
use predictor::transport::{MockTransport, ReplayTransport};
use predictor::transport::replay::load_feed;

#[derive(Parser)]
#[command(name = "predictor_cli")]
#[command(about = "Card-suit prediction engine: replay feeds and manage saved state")]
struct Cli {
    #[arg(long, default_value = "config/predictor.toml")]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded JSONL announcement file through the engine
    Replay {
        #[arg(long)]
        feed: String,
        /// Keep state in memory and print outgoing messages instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print prediction statistics from the saved state
    Stats,
    /// Print trigger rules, channels and the most recent announcements
    Status {
        #[arg(long, default_value = "10")]
        recent: usize,
    },
    /// Clear all saved predictions, fingerprints and outcomes
    Reset,
    /// Drop settled predictions older than the retention window
    Prune {
        #[arg(long)]
        days: Option<i64>,
    },
}

fn open_service(config: &Config, store: Arc<dyn StateStore>) -> Result<Arc<PredictionService>> {
    let settings = EngineSettings::from_config(config);
    Ok(Arc::new(PredictionService::open(settings, store)?))
}

fn json_store(config: &Config) -> Arc<dyn StateStore> {
    Arc::new(JsonStateStore::new(config.state_path()))
}

async fn run_replay_command(config: &Config, feed: &str, dry_run: bool) -> Result<()> {
    tracing::info!("Replaying {} (dry_run={})", feed, dry_run);

    if dry_run {
        let service = open_service(config, Arc::new(MemoryStateStore::new()))?;
        let transport = MockTransport::new("dry-run".to_string());
        for announcement in load_feed(feed)? {
            transport.push(announcement).await;
        }

        let mut relay = Relay::new(
            service.clone(),
            Box::new(transport.clone()),
            config.channels.display_channel,
        );
        relay.run().await?;

        for message in transport.outbox().await {
            let kind = if message.edited { "EDIT" } else { "SEND" };
            println!("[{} #{} -> {}] {}", kind, message.message_id, message.channel, message.text);
        }
        print_stats(&service).await;
        return Ok(());
    }

    let service = open_service(config, json_store(config))?;
    let transport = ReplayTransport::from_file("replay".to_string(), feed, config.outbox_path())?;
    let mut relay = Relay::new(
        service.clone(),
        Box::new(transport),
        config.channels.display_channel,
    );
    let snapshot = relay.run().await?;

    println!("\n=== Replay Summary ===");
    println!("Announcements: {}", snapshot.announcements);
    println!("Predictions published: {}", snapshot.predictions_published);
    println!("Messages edited: {}", snapshot.messages_edited);
    println!("Digests published: {}", snapshot.digests_published);
    println!("Transport errors: {}", snapshot.transport_errors);
    print_stats(&service).await;
    Ok(())
}

async fn print_status(config: &Config, service: &PredictionService, recent: usize) {
    let settings = EngineSettings::from_config(config);
    let digits: Vec<String> = settings.trigger_offsets.iter().map(|d| d.to_string()).collect();
    let channel = |id: Option<i64>| id.map_or("not set".to_string(), |c| c.to_string());

    println!("\n=== Engine Status ===");
    println!("Trigger digits: {}", digits.join(", "));
    println!("Verification offset: {}", settings.verification_offset);
    println!("Digest every: {} outcomes", settings.report_batch_size);
    println!("Two-phase edits: {}", settings.two_phase_edits);
    println!("Stats channel: {}", channel(config.channels.stats_channel));
    println!("Display channel: {}", channel(config.channels.display_channel));
    println!("State file: {:?}", config.state_path());

    let state = service.state().await;
    println!("Parked provisional games: {}", state.pending_edit_markers.len());
    println!(
        "Processed log: {} of {} kept",
        state.processed_log.len(),
        settings.processed_log_limit
    );

    let skip = state.processed_log.len().saturating_sub(recent);
    for entry in state.processed_log.iter().skip(skip) {
        println!(
            "  {} #{} from {}{}",
            entry.received_at.format("%Y-%m-%d %H:%M:%S"),
            entry.game_number,
            entry.channel,
            if entry.is_edit { " (edit)" } else { "" }
        );
    }
}

async fn print_stats(service: &PredictionService) {
    let stats = service.snapshot_stats().await;
    println!("\n=== Prediction Stats ===");
    println!("Total: {}", stats.total);
    println!("Wins: {}", stats.wins);
    println!("Losses: {}", stats.losses);
    println!("Pending: {}", stats.pending);
    println!("Duplicates: {}", stats.duplicates);
    println!("Win rate: {:.1}%", stats.win_rate);

    let state = service.state().await;
    let pending: Vec<String> = state
        .predictions
        .values()
        .filter(|r| r.status == PredictionStatus::Pending)
        .map(|r| format!("#{} {}", r.predicted_game_number, r.predicted_suits))
        .collect();
    if !pending.is_empty() {
        println!("Open: {}", pending.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Replay { feed, dry_run } => {
            run_replay_command(&config, &feed, dry_run).await?;
        }
        Commands::Stats => {
            let service = open_service(&config, json_store(&config))?;
            print_stats(&service).await;
        }
        Commands::Status { recent } => {
            let service = open_service(&config, json_store(&config))?;
            print_status(&config, &service, recent).await;
        }
        Commands::Reset => {
            let service = open_service(&config, json_store(&config))?;
            service.reset().await?;
            println!("State cleared: {:?}", config.state_path());
        }
        Commands::Prune { days } => {
            let service = open_service(&config, json_store(&config))?;
            let days = days.unwrap_or(config.storage.retention_days);
            let removed = service.prune(days).await?;
            println!("Removed {} settled predictions older than {} days", removed, days);
        }
    }

    Ok(())
}
