//! Watch history and watched-episode tracking.
//!
//! The session controller notifies a [`ProgressStore`] after every
//! successful resolution. Reads are best-effort and writes are
//! fire-and-forget from the controller's point of view.

mod file;
mod memory;

pub use file::FileProgressStore;
pub use memory::MemoryProgressStore;

use chrono::{DateTime, Utc};
use playgate_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::ProgressConfig;

/// A single "user is watching this episode" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    pub anime_id: String,
    pub episode_id: String,
    pub episode_label: String,
    pub episode_number: u32,
    pub title: String,
    #[serde(default)]
    pub poster: String,
}

/// Most recent progress for one anime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub anime_id: String,
    pub title: String,
    pub poster: String,
    pub last_episode_label: String,
    pub last_episode_number: u32,
    pub updated_at: DateTime<Utc>,
}

/// Change notification published by progress stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Recorded {
        anime_id: String,
        episode_number: u32,
    },
    Removed {
        anime_id: String,
    },
    Cleared,
}

/// Persistence collaborator for watch progress.
#[async_trait::async_trait]
pub trait ProgressStore: Send + Sync {
    /// Record that an episode is being watched.
    async fn record(&self, record: WatchRecord) -> Result<()>;

    /// Latest history entry for an anime, if it has resumable progress.
    async fn resume_point(&self, anime_id: &str) -> Option<HistoryEntry>;

    /// All history entries, newest first.
    async fn history(&self) -> Vec<HistoryEntry>;

    /// Drop one anime from history. Its watched episodes are kept.
    async fn remove(&self, anime_id: &str) -> Result<()>;

    /// Drop all history.
    async fn clear(&self) -> Result<()>;

    /// Episode numbers watched for an anime, in the order first watched.
    async fn watched(&self, anime_id: &str) -> Vec<u32>;

    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent>;
}

/// Create the store selected by the configuration.
pub fn create_store(config: &ProgressConfig) -> Arc<dyn ProgressStore> {
    match &config.path {
        Some(path) => {
            tracing::info!("Persisting watch progress to {:?}", path);
            Arc::new(FileProgressStore::open(path.clone(), config.history_limit))
        }
        None => Arc::new(MemoryProgressStore::new(config.history_limit)),
    }
}

/// Plain progress state shared by the store implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProgressLog {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub watched: HashMap<String, Vec<u32>>,
}

impl ProgressLog {
    /// Move the anime to the front of history and mark the episode watched.
    pub fn apply(&mut self, record: WatchRecord, history_limit: usize) {
        self.history.retain(|e| e.anime_id != record.anime_id);
        self.history.insert(
            0,
            HistoryEntry {
                anime_id: record.anime_id.clone(),
                title: record.title,
                poster: record.poster,
                last_episode_label: record.episode_label,
                last_episode_number: record.episode_number,
                updated_at: Utc::now(),
            },
        );
        self.history.truncate(history_limit);

        let episodes = self.watched.entry(record.anime_id).or_default();
        if !episodes.contains(&record.episode_number) {
            episodes.push(record.episode_number);
        }
    }

    pub fn remove(&mut self, anime_id: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|e| e.anime_id != anime_id);
        self.history.len() < before
    }
}

#[cfg(test)]
pub(crate) fn sample_record(anime_id: &str, episode_number: u32) -> WatchRecord {
    WatchRecord {
        anime_id: anime_id.to_string(),
        episode_id: format!("{anime_id}-episode-{episode_number}"),
        episode_label: format!("Episode {episode_number}"),
        episode_number,
        title: anime_id.to_uppercase(),
        poster: String::new(),
    }
}
