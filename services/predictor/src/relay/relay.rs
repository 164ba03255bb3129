use crate::engine::EngineAction;
use crate::parser::{Announcement, ChannelId};
use crate::relay::metrics::{RelayMetrics, RelayMetricsSnapshot};
use crate::relay::service::PredictionService;
use crate::transport::Transport;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{info, warn};

/// Moves announcements from a transport into the engine and carries the
/// resulting actions back out.
pub struct Relay {
    service: Arc<PredictionService>,
    transport: Box<dyn Transport>,
    display_channel: Option<ChannelId>,
    metrics: RelayMetrics,
}

impl Relay {
    pub fn new(
        service: Arc<PredictionService>,
        transport: Box<dyn Transport>,
        display_channel: Option<ChannelId>,
    ) -> Self {
        Self {
            service,
            transport,
            display_channel,
            metrics: RelayMetrics::new(),
        }
    }

    /// Run until the transport reports its feed closed
    pub async fn run(&mut self) -> Result<RelayMetricsSnapshot> {
        info!("Starting relay on transport: {}", self.transport.name());
        if self.display_channel.is_none() {
            warn!("No display channel configured, predictions will not be published");
        }

        loop {
            match self.transport.receive().await {
                Ok(Some(announcement)) => self.handle(announcement).await,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error receiving announcement: {}", e);
                    self.metrics.record_transport_error();
                    tokio::time::sleep(Duration::from_millis(1000)).await;
                }
            }
        }

        info!("Feed closed on {}", self.transport.name());
        self.metrics.log_summary();
        Ok(self.metrics.snapshot())
    }

    async fn handle(&self, announcement: Announcement) {
        self.metrics.record_announcement();

        let actions = self
            .service
            .ingest(&announcement.text, announcement.channel, announcement.is_edit)
            .await;

        // Failures stay local to the action: engine state is never rolled back
        for action in actions {
            if let Err(e) = self.execute(action).await {
                warn!("{:#}", e);
                self.metrics.record_transport_error();
            }
        }
    }

    async fn execute(&self, action: EngineAction) -> Result<()> {
        match action {
            EngineAction::Publish {
                predicted_game_number,
                text,
            } => {
                let channel = self
                    .display_channel
                    .context("Cannot publish prediction: no display channel")?;
                let message_id = self
                    .transport
                    .send_message(channel, &text)
                    .await
                    .with_context(|| {
                        format!("Failed to publish prediction #{}", predicted_game_number)
                    })?;
                self.service
                    .record_published(predicted_game_number, channel, message_id)
                    .await;
                self.metrics.record_prediction_published();
            }
            EngineAction::EditMessage {
                channel,
                message_id,
                new_text,
            } => {
                self.transport
                    .edit_message(channel, message_id, &new_text)
                    .await
                    .with_context(|| {
                        format!("Failed to edit message {} in {}", message_id, channel)
                    })?;
                self.metrics.record_message_edited();
            }
            EngineAction::PublishDigest { text } => {
                let channel = self
                    .display_channel
                    .context("Cannot publish digest: no display channel")?;
                self.transport
                    .send_message(channel, &text)
                    .await
                    .context("Failed to publish digest")?;
                self.metrics.record_digest_published();
            }
        }
        Ok(())
    }
}
