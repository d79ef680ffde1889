use playgate_core::urls::parse_http_url;
use playgate_core::{AnimeSummary, EpisodeDetail, EpisodeRef, Error, Result};
use serde::{Deserialize, Serialize};

use crate::metadata::EpisodeSource;
use crate::progress::WatchRecord;

/// Everything known about the episode a session is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeView {
    pub anime_id: String,
    pub episode: EpisodeRef,
    pub anime: AnimeSummary,
    pub detail: EpisodeDetail,
}

impl EpisodeView {
    /// Fetch the anime and episode records for a view.
    ///
    /// Anime whose content type is listed in `excluded_content_types`
    /// (case-insensitive) are refused with [`Error::Excluded`]. Episodes
    /// whose primary stream is not an absolute `http`/`https` URL are
    /// refused with [`Error::Validation`].
    pub async fn load(
        source: &dyn EpisodeSource,
        anime_id: &str,
        episode: EpisodeRef,
        excluded_content_types: &[String],
    ) -> Result<Self> {
        let episode = episode.normalized();
        let (anime, detail) =
            tokio::try_join!(source.anime(anime_id), source.episode(anime_id, &episode))?;

        if excluded_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&anime.content_type))
        {
            return Err(Error::Excluded(format!(
                "{} ({}) cannot be played",
                anime.title, anime.content_type
            )));
        }

        if parse_http_url(&detail.stream_url).is_none() {
            return Err(Error::Validation(format!(
                "episode {episode} has no playable stream URL"
            )));
        }

        Ok(Self {
            anime_id: anime_id.to_string(),
            episode,
            anime,
            detail,
        })
    }

    /// Episode number used for watched tracking.
    ///
    /// Slug references carry their number in a trailing digit run
    /// (`frieren-episode-12`); the episode label is tried next.
    pub fn episode_number(&self) -> u32 {
        match &self.episode {
            EpisodeRef::Number(n) => *n,
            EpisodeRef::Slug(slug) => trailing_number(slug)
                .or_else(|| trailing_number(&self.detail.episode))
                .unwrap_or_else(|| self.episode.number()),
        }
    }

    pub(crate) fn watch_record(&self) -> WatchRecord {
        WatchRecord {
            anime_id: self.anime_id.clone(),
            episode_id: self.episode.to_string(),
            episode_label: self.detail.episode.clone(),
            episode_number: self.episode_number(),
            title: self.anime.title.clone(),
            poster: self.anime.poster.clone(),
        }
    }
}

fn trailing_number(s: &str) -> Option<u32> {
    let trimmed = s.trim_end_matches(|c: char| !c.is_ascii_digit());
    let digits = trimmed.len()
        - trimmed
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .count();
    trimmed[digits..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_number_extraction() {
        assert_eq!(trailing_number("frieren-episode-12"), Some(12));
        assert_eq!(trailing_number("Episode 3 (Subtitle Indonesia)"), Some(3));
        assert_eq!(trailing_number("no digits"), None);
        assert_eq!(trailing_number(""), None);
    }
}
