//! Serialized access to the engine plus persistence after every change

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::engine::{Engine, EngineAction, EngineSettings, EngineState, EngineStats};
use crate::parser::{ChannelId, MessageId};
use crate::storage::{StateStore, StoreError};

/// Owns the engine behind one lock. Each call runs start to finish,
/// state save included, before the next one starts.
pub struct PredictionService {
    engine: Mutex<Engine>,
    store: Arc<dyn StateStore>,
}

impl PredictionService {
    pub fn new(engine: Engine, store: Arc<dyn StateStore>) -> Self {
        Self {
            engine: Mutex::new(engine),
            store,
        }
    }

    /// Build an engine from whatever the store holds, empty if nothing
    pub fn open(settings: EngineSettings, store: Arc<dyn StateStore>) -> Result<Self> {
        let state = store
            .load()
            .context("Failed to load engine state")?
            .unwrap_or_default();
        Ok(Self::new(Engine::with_state(settings, state), store))
    }

    fn persist(&self, engine: &mut Engine) -> Result<(), StoreError> {
        if engine.take_dirty() {
            self.store.save(engine.state())?;
        }
        Ok(())
    }

    /// A failed save is logged, not returned: the decision already stands
    /// and the next successful save writes the whole state anyway.
    pub async fn ingest(
        &self,
        raw_text: &str,
        origin: ChannelId,
        is_edit: bool,
    ) -> Vec<EngineAction> {
        let mut engine = self.engine.lock().await;
        let actions = engine.ingest(raw_text, origin, is_edit);
        if let Err(e) = self.persist(&mut engine) {
            warn!("Failed to save engine state: {}", e);
        }
        actions
    }

    pub async fn record_published(
        &self,
        predicted_game_number: u32,
        channel: ChannelId,
        message_id: MessageId,
    ) -> bool {
        let mut engine = self.engine.lock().await;
        let known = engine.record_published(predicted_game_number, channel, message_id);
        if let Err(e) = self.persist(&mut engine) {
            warn!("Failed to save engine state: {}", e);
        }
        known
    }

    pub async fn snapshot_stats(&self) -> EngineStats {
        self.engine.lock().await.snapshot_stats()
    }

    pub async fn state(&self) -> EngineState {
        self.engine.lock().await.state().clone()
    }

    pub async fn reset(&self) -> Result<()> {
        let mut engine = self.engine.lock().await;
        engine.reset();
        self.persist(&mut engine).context("Failed to save state after reset")?;
        Ok(())
    }

    /// Drop settled predictions older than `retention_days`
    pub async fn prune(&self, retention_days: i64) -> Result<usize> {
        let cutoff = chrono::Duration::try_days(retention_days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .with_context(|| format!("Retention of {} days is out of range", retention_days))?;
        let mut engine = self.engine.lock().await;
        let removed = engine.prune_resolved_before(cutoff);
        self.persist(&mut engine).context("Failed to save state after prune")?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;

    /// Loads nothing and refuses every save
    struct BrokenStore;

    impl StateStore for BrokenStore {
        fn load(&self) -> Result<Option<EngineState>, StoreError> {
            Ok(None)
        }

        fn save(&self, _state: &EngineState) -> Result<(), StoreError> {
            Err(StoreError::Other("disk full".to_string()))
        }
    }

    fn service(store: Arc<MemoryStateStore>) -> PredictionService {
        PredictionService::open(EngineSettings::default(), store).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_saves_state() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(store.clone());

        let actions = service.ingest("#N47. (K♠️7♥️)", -1, false).await;
        assert_eq!(actions.len(), 1);
        assert!(store.has_saved());

        let saved = store.load().unwrap().unwrap();
        assert!(saved.predictions.contains_key(&50));
    }

    #[tokio::test]
    async fn test_noop_ingest_does_not_save() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(store.clone());

        assert!(service.ingest("hello", -1, false).await.is_empty());
        assert!(!store.has_saved());
    }

    #[tokio::test]
    async fn test_reopen_restores_state() {
        let store = Arc::new(MemoryStateStore::new());
        {
            let service = service(store.clone());
            service.ingest("#N47. (K♠️7♥️)", -1, false).await;
            assert!(service.record_published(50, -2, 11).await);
        }

        let service = service(store.clone());
        let state = service.state().await;
        let record = &state.predictions[&50];
        assert_eq!(record.outgoing_message_ref.map(|r| r.message_id), Some(11));

        // Dedup survives the restart
        assert!(service.ingest("#N47. (K♠️7♥️)", -1, false).await.len() == 1);
        assert_eq!(service.snapshot_stats().await.duplicates, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ingest_creates_one_prediction() {
        let store = Arc::new(MemoryStateStore::new());
        let service = Arc::new(service(store));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.ingest("#N47. (K♠️7♥️)", -1, false).await
            }));
        }

        let mut published = 0;
        for handle in handles {
            let actions = handle.await.unwrap();
            published += actions
                .iter()
                .filter(|a| matches!(a, EngineAction::Publish { .. }))
                .count();
        }

        assert_eq!(published, 1);
        assert_eq!(service.state().await.predictions.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_persists_empty_state() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(store.clone());
        service.ingest("#N47. (K♠️7♥️)", -1, false).await;

        service.reset().await.unwrap();
        assert!(store.load().unwrap().unwrap().is_empty());
        assert_eq!(service.snapshot_stats().await, EngineStats::default());
    }

    #[tokio::test]
    async fn test_prune_keeps_recent() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(store);
        service.ingest("#N47. (K♠️7♥️)", -1, false).await;
        service.ingest("#N50. (K♠️7♥️) - (A♦️5♣️)", -1, false).await;

        assert_eq!(service.prune(30).await.unwrap(), 0);
        assert_eq!(service.state().await.predictions.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_decision() {
        let service =
            PredictionService::open(EngineSettings::default(), Arc::new(BrokenStore)).unwrap();

        let actions = service.ingest("#N47. (K♠️7♥️)", -1, false).await;
        assert!(matches!(
            actions.as_slice(),
            [EngineAction::Publish { predicted_game_number: 50, .. }]
        ));
        assert!(service.record_published(50, -2, 3).await);

        let actions = service.ingest("#N50. ✅(K♠️9♥️) - (A♦️5♣️)", -1, false).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(service.snapshot_stats().await.wins, 1);

        // Explicit maintenance calls surface the store error
        assert!(service.reset().await.is_err());
    }

    #[tokio::test]
    async fn test_prune_rejects_out_of_range_window() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(store);
        service.ingest("#N47. (K♠️7♥️)", -1, false).await;

        assert!(service.prune(200_000_000).await.is_err());
        assert!(service.prune(i64::MAX).await.is_err());
        assert_eq!(service.state().await.predictions.len(), 1);
    }
}
