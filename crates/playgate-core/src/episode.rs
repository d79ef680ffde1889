//! Episode records returned by the metadata API.
//!
//! Only the fields the playback core needs are modelled; everything else
//! in the upstream payload is ignored during deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::urls::parse_http_url;

/// Label shown for the episode's primary stream.
pub const DEFAULT_SERVER_LABEL: &str = "Default Server";

/// Playable episode as returned by the metadata API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeDetail {
    /// Human-readable episode label, e.g. "Episode 3".
    pub episode: String,
    /// Primary stream URL (frequently a redirecting safelink).
    pub stream_url: String,
    #[serde(default)]
    pub download_urls: DownloadUrls,
    #[serde(default)]
    pub has_next_episode: bool,
    #[serde(default)]
    pub next_episode: Option<EpisodeLink>,
    #[serde(default)]
    pub has_previous_episode: bool,
    #[serde(default)]
    pub previous_episode: Option<EpisodeLink>,
}

/// Reference to a neighbouring episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeLink {
    pub slug: String,
}

/// Alternate download entries grouped by container format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadUrls {
    #[serde(default)]
    pub mp4: Vec<StreamGroup>,
    #[serde(default)]
    pub mkv: Vec<StreamGroup>,
}

/// Download entries for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamGroup {
    pub resolution: String,
    #[serde(default)]
    pub urls: Vec<ProviderLink>,
}

/// A single provider-hosted copy of the episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub provider: String,
    pub url: String,
}

/// Anime-level metadata needed to mount an episode view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeSummary {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub poster: String,
    /// Content type reported upstream ("TV", "Movie", "OVA", ...).
    #[serde(rename = "type", default)]
    pub content_type: String,
}

/// An alternate server the user may switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateServer {
    pub provider: String,
    pub resolution: String,
    pub url: String,
}

impl CandidateServer {
    /// Label shown as "currently playing" once this server is selected.
    pub fn label(&self) -> String {
        format!("{} - {}", self.provider, self.resolution)
    }
}

impl EpisodeDetail {
    /// Flatten the mp4 download groups into switchable servers.
    ///
    /// Only providers whose label contains one of `allowed_providers`
    /// (case-insensitive) and whose link is an absolute `http`/`https` URL
    /// are kept, in upstream order.
    pub fn candidate_servers(&self, allowed_providers: &[String]) -> Vec<CandidateServer> {
        let allowed: Vec<String> = allowed_providers
            .iter()
            .map(|p| p.to_lowercase())
            .collect();

        self.download_urls
            .mp4
            .iter()
            .flat_map(|group| {
                group.urls.iter().filter_map(|link| {
                    let provider = link.provider.to_lowercase();
                    let playable = allowed.iter().any(|a| provider.contains(a.as_str()))
                        && parse_http_url(&link.url).is_some();
                    playable.then(|| CandidateServer {
                        provider: link.provider.clone(),
                        resolution: group.resolution.clone(),
                        url: link.url.clone(),
                    })
                })
            })
            .collect()
    }
}

/// How an episode is addressed in the metadata API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodeRef {
    /// Episode number within an anime.
    Number(u32),
    /// Standalone episode slug.
    Slug(String),
}

impl EpisodeRef {
    /// Episode number used for watched-episode tracking.
    ///
    /// Slug references have no number and count as episode 1.
    pub fn number(&self) -> u32 {
        match self {
            Self::Number(n) => *n,
            Self::Slug(_) => 1,
        }
    }

    /// Turn numeric slugs (e.g. `"3"` sent as a JSON string) into numbers.
    pub fn normalized(self) -> Self {
        match self {
            Self::Slug(s) => s.parse().unwrap_or(Self::Slug(s)),
            number => number,
        }
    }
}

impl FromStr for EpisodeRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<u32>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Slug(s.trim().to_string()),
        })
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Slug(s) => f.write_str(s),
        }
    }
}
