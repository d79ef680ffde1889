//! Bounded redirect chasing for third-party stream links.
//!
//! Stream links handed out by the metadata API are usually safelinks or
//! shorteners. [`RedirectResolver`] follows their redirect chain by hand,
//! one hop at a time, so the final provider URL can be classified.

use anyhow::{Context, Result};
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::ResolverConfig;

/// Maximum number of requests issued while following one chain.
pub const MAX_HOPS: usize = 5;

/// Something that turns a raw link into the URL that should be classified.
///
/// The session controller depends on this seam rather than on the HTTP
/// resolver directly.
#[async_trait::async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, url: &str) -> playgate_core::Result<String>;
}

/// Follows HTTP redirects manually, up to [`MAX_HOPS`] requests.
#[derive(Clone)]
pub struct RedirectResolver {
    client: Client,
    user_agent: String,
}

impl RedirectResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build resolver HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve `url` to the last URL reached in its redirect chain.
    ///
    /// Never fails: on any network or parse error the input is returned
    /// unchanged.
    pub async fn resolve(&self, url: &str) -> String {
        match self.follow(url).await {
            Ok(resolved) => {
                if resolved != url {
                    tracing::debug!(from = %url, to = %resolved, "Resolved redirect chain");
                }
                resolved
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Redirect resolution failed, using original URL");
                url.to_string()
            }
        }
    }

    async fn follow(&self, url: &str) -> Result<String> {
        let mut current = url.to_string();

        for hop in 1..=MAX_HOPS {
            match self.next_hop(&current).await? {
                Some(next) => {
                    tracing::trace!(hop, url = %next, "Following redirect");
                    current = next;
                }
                None => break,
            }
        }

        Ok(current)
    }

    /// Request `current` once and return the redirect target, if any.
    async fn next_hop(&self, current: &str) -> Result<Option<String>> {
        let target = Url::parse(current).with_context(|| format!("Invalid URL: {current}"))?;

        let response = self
            .client
            .get(target.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .with_context(|| format!("Request failed: {current}"))?;

        if !response.status().is_redirection() {
            return Ok(None);
        }

        let Some(location) = response.headers().get(LOCATION) else {
            return Ok(None);
        };
        let location = location
            .to_str()
            .context("Location header is not valid UTF-8")?;

        Ok(Some(next_url(&target, location)))
    }
}

/// Compute the next URL for a `Location` value.
///
/// Path-absolute locations are joined to the origin of the current URL,
/// discarding its path and query. Anything else is taken verbatim.
fn next_url(current: &Url, location: &str) -> String {
    if location.starts_with('/') {
        format!("{}{}", current.origin().ascii_serialization(), location)
    } else {
        location.to_string()
    }
}

#[async_trait::async_trait]
impl Resolve for RedirectResolver {
    async fn resolve(&self, url: &str) -> playgate_core::Result<String> {
        Ok(RedirectResolver::resolve(self, url).await)
    }
}
