//! Anime metadata API collaborator.
//!
//! Playback only needs two lookups from the metadata API: the episode
//! record (primary stream plus alternate download links) and the anime
//! summary (title, poster, content type).

mod client;

pub use client::MetadataClient;

use playgate_core::{AnimeSummary, EpisodeDetail, EpisodeRef, Result};

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Read-only source of episode and anime records.
#[async_trait::async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Fetch one episode of an anime.
    async fn episode(&self, anime_id: &str, episode: &EpisodeRef) -> Result<EpisodeDetail>;

    /// Fetch the anime summary.
    async fn anime(&self, anime_id: &str) -> Result<AnimeSummary>;
}
