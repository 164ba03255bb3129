use super::traits::{OutgoingMessage, Transport};
use crate::parser::{Announcement, ChannelId, MessageId};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Scripted transport. Clones share the same queues, so a test can keep
/// a handle while the relay owns another.
#[derive(Clone)]
pub struct MockTransport {
    name: String,
    inbound: Arc<Mutex<VecDeque<Announcement>>>,
    outbox: Arc<Mutex<Vec<OutgoingMessage>>>,
    next_message_id: Arc<AtomicI64>,
    fail_sends: Arc<AtomicBool>,
    fail_edits: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(name: String) -> Self {
        Self {
            name,
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            outbox: Arc::new(Mutex::new(Vec::new())),
            next_message_id: Arc::new(AtomicI64::new(1)),
            fail_sends: Arc::new(AtomicBool::new(false)),
            fail_edits: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn push(&self, announcement: Announcement) {
        self.inbound.lock().await.push_back(announcement);
    }

    pub async fn outbox(&self) -> Vec<OutgoingMessage> {
        self.outbox.lock().await.clone()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self) -> Result<Option<Announcement>> {
        let mut inbound = self.inbound.lock().await;
        Ok(inbound.pop_front())
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId> {
        if self.fail_sends.load(Ordering::Relaxed) {
            anyhow::bail!("mock send to {} refused", channel);
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        self.outbox.lock().await.push(OutgoingMessage {
            channel,
            message_id,
            text: text.to_string(),
            edited: false,
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        text: &str,
    ) -> Result<()> {
        if self.fail_edits.load(Ordering::Relaxed) {
            anyhow::bail!("mock edit of {} in {} refused", message_id, channel);
        }
        self.outbox.lock().await.push(OutgoingMessage {
            channel,
            message_id,
            text: text.to_string(),
            edited: true,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_queue() {
        let mut transport = MockTransport::new("test".to_string());
        transport.push(Announcement::new("#N47 (K♠7♥)", -1)).await;

        let first = transport.receive().await.unwrap();
        assert_eq!(first.map(|a| a.text), Some("#N47 (K♠7♥)".to_string()));
        assert!(transport.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_transport_ids_and_outbox() {
        let transport = MockTransport::new("test".to_string());
        let handle = transport.clone();

        let a = transport.send_message(-2, "one").await.unwrap();
        let b = transport.send_message(-2, "two").await.unwrap();
        assert_eq!(b, a + 1);
        transport.edit_message(-2, a, "one edited").await.unwrap();

        let outbox = handle.outbox().await;
        assert_eq!(outbox.len(), 3);
        assert!(outbox[2].edited);
        assert_eq!(outbox[2].message_id, a);
    }

    #[tokio::test]
    async fn test_mock_transport_failures() {
        let transport = MockTransport::new("test".to_string());
        transport.set_fail_sends(true);
        transport.set_fail_edits(true);
        assert!(transport.send_message(-2, "x").await.is_err());
        assert!(transport.edit_message(-2, 1, "x").await.is_err());
        assert!(transport.outbox().await.is_empty());
    }
}
