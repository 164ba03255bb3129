use anyhow::{Context, Result};
use predictor::config::Config;
use predictor::engine::EngineSettings;
use predictor::relay::{PredictionService, Relay};
use predictor::storage::{JsonStateStore, StateStore};
use predictor::transport::ReplayTransport;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/predictor.toml".to_string());

    let config = Config::load(&config_path)?;
    let store: Arc<dyn StateStore> = Arc::new(JsonStateStore::new(config.state_path()));
    let service = Arc::new(PredictionService::open(
        EngineSettings::from_config(&config),
        store,
    )?);

    let retention_days = config.storage.retention_days;
    let pruned = service.prune(retention_days).await?;
    info!("Startup prune removed {} settled predictions", pruned);

    let replay = config
        .replay
        .as_ref()
        .context("No [replay] section in config: nothing to read announcements from")?;
    let transport = ReplayTransport::from_file(
        "replay".to_string(),
        &replay.feed_path,
        config.outbox_path(),
    )?;

    let prune_service = service.clone();
    let prune_every = Duration::from_secs(config.storage.prune_interval_secs.max(1));
    let pruner = tokio::spawn(async move {
        let mut ticker = interval(prune_every);
        // First tick fires immediately; startup already pruned
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = prune_service.prune(retention_days).await {
                warn!("Periodic prune failed: {:#}", e);
            }
        }
    });

    let mut relay = Relay::new(
        service.clone(),
        Box::new(transport),
        config.channels.display_channel,
    );
    let result = relay.run().await;
    pruner.abort();
    result?;

    let stats = service.snapshot_stats().await;
    info!(
        "Engine: {} predictions ({} won, {} lost, {} pending, {} duplicate), win rate {:.1}%",
        stats.total, stats.wins, stats.losses, stats.pending, stats.duplicates, stats.win_rate
    );

    Ok(())
}
