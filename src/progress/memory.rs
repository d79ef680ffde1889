use parking_lot::RwLock;
use playgate_core::Result;
use tokio::sync::broadcast;

use super::{HistoryEntry, ProgressEvent, ProgressLog, ProgressStore, WatchRecord};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Progress store that keeps everything in process memory.
pub struct MemoryProgressStore {
    log: RwLock<ProgressLog>,
    history_limit: usize,
    event_tx: broadcast::Sender<ProgressEvent>,
}

impl MemoryProgressStore {
    pub fn new(history_limit: usize) -> Self {
        Self::with_log(ProgressLog::default(), history_limit)
    }

    pub(crate) fn with_log(log: ProgressLog, history_limit: usize) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            log: RwLock::new(log),
            history_limit,
            event_tx,
        }
    }

    pub(crate) fn snapshot(&self) -> ProgressLog {
        self.log.read().clone()
    }

    pub(crate) fn apply_record(&self, record: WatchRecord) {
        let event = ProgressEvent::Recorded {
            anime_id: record.anime_id.clone(),
            episode_number: record.episode_number,
        };
        self.log.write().apply(record, self.history_limit);
        self.publish(event);
    }

    pub(crate) fn apply_remove(&self, anime_id: &str) -> bool {
        let removed = self.log.write().remove(anime_id);
        if removed {
            self.publish(ProgressEvent::Removed {
                anime_id: anime_id.to_string(),
            });
        }
        removed
    }

    pub(crate) fn apply_clear(&self) {
        self.log.write().history.clear();
        self.publish(ProgressEvent::Cleared);
    }

    fn publish(&self, event: ProgressEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new(20)
    }
}

#[async_trait::async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn record(&self, record: WatchRecord) -> Result<()> {
        self.apply_record(record);
        Ok(())
    }

    async fn resume_point(&self, anime_id: &str) -> Option<HistoryEntry> {
        self.log
            .read()
            .history
            .iter()
            .find(|e| e.anime_id == anime_id)
            .cloned()
    }

    async fn history(&self) -> Vec<HistoryEntry> {
        self.log.read().history.clone()
    }

    async fn remove(&self, anime_id: &str) -> Result<()> {
        self.apply_remove(anime_id);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.apply_clear();
        Ok(())
    }

    async fn watched(&self, anime_id: &str) -> Vec<u32> {
        self.log
            .read()
            .watched
            .get(anime_id)
            .cloned()
            .unwrap_or_default()
    }

    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::sample_record;

    #[tokio::test]
    async fn record_then_resume() {
        let store = MemoryProgressStore::default();
        assert!(store.resume_point("frieren").await.is_none());

        store.record(sample_record("frieren", 3)).await.unwrap();

        let entry = store.resume_point("frieren").await.unwrap();
        assert_eq!(entry.last_episode_number, 3);
        assert_eq!(store.watched("frieren").await, vec![3]);
        assert_eq!(store.history().await.len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = MemoryProgressStore::default();
        let mut rx = store.subscribe();

        store.record(sample_record("a", 1)).await.unwrap();
        store.remove("a").await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Recorded {
                anime_id: "a".into(),
                episode_number: 1
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Removed {
                anime_id: "a".into()
            }
        );
        assert_eq!(rx.recv().await.unwrap(), ProgressEvent::Cleared);
    }

    #[tokio::test]
    async fn removing_unknown_anime_is_silent() {
        let store = MemoryProgressStore::default();
        let mut rx = store.subscribe();
        store.remove("missing").await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn clear_keeps_watched_episodes() {
        let store = MemoryProgressStore::default();
        store.record(sample_record("a", 2)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.history().await.is_empty());
        assert_eq!(store.watched("a").await, vec![2]);
    }
}
