//! Live playback session tracking.
//!
//! Tracks mounted episode views with automatic cleanup of idle sessions.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::controller::{PlaybackSession, SessionDeps};
use super::view::EpisodeView;

struct Entry {
    session: Arc<PlaybackSession>,
    started_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

/// Thread-safe registry of playback sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, Entry>>,
    deps: SessionDeps,
    /// Idle time after which a session is considered expired.
    expiry_duration: Duration,
}

impl SessionRegistry {
    pub fn new(deps: SessionDeps, expiry: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            deps,
            expiry_duration: expiry,
        }
    }

    /// Mount a new session for `view`. The session starts idle.
    pub fn register(&self, view: EpisodeView) -> Arc<PlaybackSession> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        tracing::info!(
            session_id = %session_id,
            anime_id = %view.anime_id,
            episode = %view.episode,
            "Registered playback session"
        );

        let session = Arc::new(PlaybackSession::new(
            session_id.clone(),
            view,
            self.deps.clone(),
        ));
        self.sessions.insert(
            session_id,
            Entry {
                session: session.clone(),
                started_at: now,
                last_seen: now,
            },
        );

        session
    }

    /// Look up a session and refresh its activity timestamp.
    pub fn get(&self, session_id: &str) -> Option<Arc<PlaybackSession>> {
        let mut entry = self.sessions.get_mut(session_id)?;
        entry.last_seen = Utc::now();
        Some(entry.session.clone())
    }

    /// End a session. Returns false if it did not exist.
    pub fn end_session(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, entry)) => {
                tracing::info!(
                    session_id = %session_id,
                    duration_secs = (Utc::now() - entry.started_at).num_seconds(),
                    "Ended playback session"
                );
                true
            }
            None => false,
        }
    }

    /// Remove sessions that have been idle longer than the expiry duration.
    ///
    /// # Returns
    /// The number of sessions that were removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let now = Utc::now();
        let expiry = chrono::Duration::from_std(self.expiry_duration)
            .unwrap_or_else(|_| chrono::Duration::seconds(3600));

        let mut removed_count = 0;
        self.sessions.retain(|session_id, entry| {
            let elapsed = now - entry.last_seen;
            if elapsed > expiry {
                tracing::info!(
                    session_id = %session_id,
                    inactive_secs = elapsed.num_seconds(),
                    "Expired session removed"
                );
                removed_count += 1;
                false
            } else {
                true
            }
        });

        if removed_count > 0 {
            tracing::debug!(removed = removed_count, "Cleaned up expired sessions");
        }

        removed_count
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Start a background task that periodically evicts idle sessions.
pub fn start_cleanup_task(
    registry: SessionRegistry,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            registry.cleanup_expired_sessions();
        }
    })
}
