use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters for one relay run
#[derive(Clone, Default)]
pub struct RelayMetrics {
    announcements: Arc<AtomicU64>,
    predictions_published: Arc<AtomicU64>,
    messages_edited: Arc<AtomicU64>,
    digests_published: Arc<AtomicU64>,
    transport_errors: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayMetricsSnapshot {
    pub announcements: u64,
    pub predictions_published: u64,
    pub messages_edited: u64,
    pub digests_published: u64,
    pub transport_errors: u64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_announcement(&self) {
        self.announcements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction_published(&self) {
        self.predictions_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_edited(&self) {
        self.messages_edited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_digest_published(&self) {
        self.digests_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayMetricsSnapshot {
        RelayMetricsSnapshot {
            announcements: self.announcements.load(Ordering::Relaxed),
            predictions_published: self.predictions_published.load(Ordering::Relaxed),
            messages_edited: self.messages_edited.load(Ordering::Relaxed),
            digests_published: self.digests_published.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            "Relay: {} announcements, {} predictions, {} edits, {} digests, {} transport errors",
            s.announcements,
            s.predictions_published,
            s.messages_edited,
            s.digests_published,
            s.transport_errors
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_shared_between_clones() {
        let metrics = RelayMetrics::new();
        let handle = metrics.clone();

        metrics.record_announcement();
        metrics.record_announcement();
        metrics.record_prediction_published();
        metrics.record_transport_error();

        let s = handle.snapshot();
        assert_eq!(s.announcements, 2);
        assert_eq!(s.predictions_published, 1);
        assert_eq!(s.transport_errors, 1);
        assert_eq!(s.messages_edited, 0);
    }
}
