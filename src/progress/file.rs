use parking_lot::Mutex;
use playgate_core::Result;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

use super::{
    HistoryEntry, MemoryProgressStore, ProgressEvent, ProgressLog, ProgressStore, WatchRecord,
};

/// Progress store persisted as a JSON document after every change.
pub struct FileProgressStore {
    inner: MemoryProgressStore,
    path: PathBuf,
    /// Serializes snapshot + write so concurrent writers never interleave.
    write_lock: Mutex<()>,
}

impl FileProgressStore {
    /// Open (or start) the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also
    /// starts empty, with a warning, and is overwritten on the next change.
    pub fn open(path: PathBuf, history_limit: usize) -> Self {
        let log = match load_from_file(&path) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!("Failed to load progress from {:?}, starting empty: {}", path, e);
                ProgressLog::default()
            }
        };

        Self {
            inner: MemoryProgressStore::with_log(log, history_limit),
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state via a temp file and rename.
    fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        let json = serde_json::to_string_pretty(&self.inner.snapshot())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

fn load_from_file(path: &Path) -> Result<ProgressLog> {
    if !path.exists() {
        return Ok(ProgressLog::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait::async_trait]
impl ProgressStore for FileProgressStore {
    async fn record(&self, record: WatchRecord) -> Result<()> {
        self.inner.apply_record(record);
        self.persist()
    }

    async fn resume_point(&self, anime_id: &str) -> Option<HistoryEntry> {
        self.inner.resume_point(anime_id).await
    }

    async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.history().await
    }

    async fn remove(&self, anime_id: &str) -> Result<()> {
        if self.inner.apply_remove(anime_id) {
            self.persist()?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.apply_clear();
        self.persist()
    }

    async fn watched(&self, anime_id: &str) -> Vec<u32> {
        self.inner.watched(anime_id).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::sample_record;
    use tempfile::tempdir;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let store = FileProgressStore::open(path.clone(), 20);
        store.record(sample_record("frieren", 1)).await.unwrap();
        store.record(sample_record("frieren", 2)).await.unwrap();
        store.record(sample_record("bocchi", 5)).await.unwrap();
        drop(store);

        let reopened = FileProgressStore::open(path, 20);
        let history = reopened.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].anime_id, "bocchi");
        assert_eq!(reopened.watched("frieren").await, vec![1, 2]);
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileProgressStore::open(path.clone(), 20);
        assert!(store.history().await.is_empty());

        store.record(sample_record("a", 1)).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"anime_id\": \"a\""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_leave_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let store = std::sync::Arc::new(FileProgressStore::open(path.clone(), 50));

        // Long records first, then short ones, so a torn write would leave
        // trailing bytes behind.
        let handles: Vec<_> = (0..32u32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let id = if i < 16 {
                        format!("anime-with-a-rather-long-identifier-{i}")
                    } else {
                        format!("a{i}")
                    };
                    store.record(sample_record(&id, i)).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let log: ProgressLog = serde_json::from_str(&content).unwrap();
        assert_eq!(log.history.len(), 32);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/state/progress.json");

        let store = FileProgressStore::open(path.clone(), 20);
        store.record(sample_record("a", 1)).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn clear_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let store = FileProgressStore::open(path.clone(), 20);
        store.record(sample_record("a", 1)).await.unwrap();
        store.clear().await.unwrap();

        let reopened = FileProgressStore::open(path, 20);
        assert!(reopened.history().await.is_empty());
    }
}
