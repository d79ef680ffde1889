use playgate_core::{AnimeSummary, EpisodeDetail, EpisodeRef, Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::EpisodeSource;
use crate::config::MetadataConfig;

/// Response envelope used by every metadata endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// HTTP client for the anime metadata API.
#[derive(Clone)]
pub struct MetadataClient {
    client: Client,
    base_url: Url,
}

impl MetadataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Validation(format!("invalid metadata base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Validation(format!(
                "metadata base URL '{base_url}' cannot have path segments"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build metadata HTTP client: {}", e);
                Client::new()
            });

        Ok(Self { client, base_url })
    }

    /// Build a client from configuration, if a base URL is configured.
    pub fn from_config(config: &MetadataConfig) -> Result<Option<Self>> {
        config
            .base_url
            .as_deref()
            .map(|base| Self::new(base, Duration::from_secs(config.timeout_secs)))
            .transpose()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, entity: &str, id: &str, url: Url) -> Result<T> {
        tracing::debug!(url = %url, "Fetching metadata");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::upstream(502, format!("metadata request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(entity, id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                status.as_u16(),
                format!("metadata API returned {status} for {url}: {body}"),
            ));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            Error::upstream(status.as_u16(), format!("invalid metadata response: {e}"))
        })?;
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl EpisodeSource for MetadataClient {
    async fn episode(&self, anime_id: &str, episode: &EpisodeRef) -> Result<EpisodeDetail> {
        let url = match episode {
            EpisodeRef::Number(n) => {
                let n = n.to_string();
                self.endpoint(&["anime", anime_id, "episodes", &n])
            }
            EpisodeRef::Slug(slug) => self.endpoint(&["episode", slug]),
        };
        self.get("episode", &format!("{anime_id}/{episode}"), url)
            .await
    }

    async fn anime(&self, anime_id: &str) -> Result<AnimeSummary> {
        let url = self.endpoint(&["anime", anime_id]);
        self.get("anime", anime_id, url).await
    }
}
