//! Replays a recorded feed from a JSONL file
//!
//! Each line is an `Announcement`. Outgoing messages are appended to an
//! optional JSONL outbox so a run can be inspected afterwards.

use super::traits::{OutgoingMessage, Transport};
use crate::parser::{Announcement, ChannelId, MessageId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;

pub struct ReplayTransport {
    name: String,
    feed: VecDeque<Announcement>,
    outbox_path: Option<PathBuf>,
    outbox: Mutex<Option<std::fs::File>>,
    next_message_id: AtomicI64,
}

/// Load announcements from a JSONL file, skipping blank lines
pub fn load_feed<P: AsRef<Path>>(path: P) -> Result<Vec<Announcement>> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("Feed file not found: {:?}", path);
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open feed file: {:?}", path))?;
    let reader = BufReader::new(file);

    let mut announcements = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let announcement: Announcement = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse announcement: {}", line))?;
        announcements.push(announcement);
    }

    Ok(announcements)
}

impl ReplayTransport {
    pub fn new(name: String, feed: Vec<Announcement>, outbox_path: Option<PathBuf>) -> Self {
        Self {
            name,
            feed: feed.into(),
            outbox_path,
            outbox: Mutex::new(None),
            next_message_id: AtomicI64::new(1),
        }
    }

    pub fn from_file<P: AsRef<Path>>(
        name: String,
        feed_path: P,
        outbox_path: Option<PathBuf>,
    ) -> Result<Self> {
        let feed = load_feed(&feed_path)?;
        tracing::info!("Loaded {} announcements from {:?}", feed.len(), feed_path.as_ref());
        Ok(Self::new(name, feed, outbox_path))
    }

    pub fn remaining(&self) -> usize {
        self.feed.len()
    }

    async fn append_outbox(&self, message: &OutgoingMessage) -> Result<()> {
        let Some(path) = &self.outbox_path else {
            return Ok(());
        };

        let mut outbox = self.outbox.lock().await;
        if outbox.is_none() {
            if let Some(dir) = path.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open outbox: {:?}", path))?;
            *outbox = Some(file);
        }

        if let Some(file) = outbox.as_mut() {
            let json = serde_json::to_string(message)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self) -> Result<Option<Announcement>> {
        Ok(self.feed.pop_front())
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        tracing::info!("[{}] send #{} to {}: {}", self.name, message_id, channel, text);
        self.append_outbox(&OutgoingMessage {
            channel,
            message_id,
            text: text.to_string(),
            edited: false,
        })
        .await?;
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        text: &str,
    ) -> Result<()> {
        tracing::info!("[{}] edit #{} in {}: {}", self.name, message_id, channel, text);
        self.append_outbox(&OutgoingMessage {
            channel,
            message_id,
            text: text.to_string(),
            edited: true,
        })
        .await
    }
}
