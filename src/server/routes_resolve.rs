//! One-shot classification and resolution endpoints.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use playgate_core::urls::parse_http_url;
use playgate_core::{Error, PlaybackDirective};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;
use crate::streaming::RELAY_ENDPOINT;

// ---------------------------------------------------------------------------
// Request / response schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub url: Option<String>,
    #[serde(default)]
    pub provider: String,
}

impl ResolveParams {
    /// The `url` parameter, which must be an absolute `http`/`https` URL.
    fn required_url(&self) -> Result<&str, AppError> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Validation("url is required".into()))?;

        if parse_http_url(url).is_none() {
            return Err(Error::Validation(format!("'{url}' is not an absolute http(s) URL")).into());
        }
        Ok(url)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DirectiveResponse {
    #[serde(flatten)]
    pub directive: PlaybackDirective,
    /// Relay path to load instead of `url` when the mode requires it.
    pub relay_path: Option<String>,
}

impl From<PlaybackDirective> for DirectiveResponse {
    fn from(directive: PlaybackDirective) -> Self {
        Self {
            relay_path: directive.relay_path(RELAY_ENDPOINT),
            directive,
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn resolve_routes() -> Router<AppContext> {
    Router::new()
        .route("/classify", get(classify))
        .route("/resolve", get(resolve))
}

/// GET /api/classify?url=&provider=
///
/// Classify a URL as-is, without following redirects.
async fn classify(
    State(ctx): State<AppContext>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<DirectiveResponse>, AppError> {
    let url = params.required_url()?;
    let directive = ctx.classifier.classify(url, &params.provider);
    Ok(Json(directive.into()))
}

/// GET /api/resolve?url=&provider=
///
/// Follow the URL's redirect chain, then classify the final URL.
async fn resolve(
    State(ctx): State<AppContext>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<DirectiveResponse>, AppError> {
    let url = params.required_url()?;
    let directive = match ctx.resolver.resolve(url).await {
        Ok(resolved) if parse_http_url(&resolved).is_none() => {
            tracing::warn!(
                url = %url,
                resolved = %resolved,
                "Resolved URL is not absolute http(s), using raw URL"
            );
            PlaybackDirective::fallback(url)
        }
        Ok(resolved) => ctx.classifier.classify(&resolved, &params.provider),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Resolution failed, using raw URL");
            PlaybackDirective::fallback(url)
        }
    };
    Ok(Json(directive.into()))
}
