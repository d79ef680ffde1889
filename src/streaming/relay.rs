use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use playgate_core::urls::{origin, parse_http_url};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::RelayConfig;
use crate::server::AppContext;

/// Query parameters accepted by the relay endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub url: Option<String>,
}

/// Passthrough proxy for third-party media.
#[derive(Clone)]
pub struct StreamingRelay {
    client: Client,
    user_agent: String,
    default_content_type: String,
}

impl StreamingRelay {
    pub fn new(config: &RelayConfig) -> Self {
        // Redirects are followed by the client; no overall timeout so long
        // bodies can stream for as long as the consumer reads.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build relay HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            user_agent: config.user_agent.clone(),
            default_content_type: config.default_content_type.clone(),
        }
    }

    /// Relay `target` and build the response for the rendering surface.
    pub async fn relay(&self, target: Option<&str>) -> Response {
        let Some(raw) = target.filter(|t| !t.trim().is_empty()) else {
            return (StatusCode::BAD_REQUEST, "Missing URL parameter").into_response();
        };

        let Some(url) = parse_http_url(raw) else {
            return (StatusCode::BAD_REQUEST, "Invalid URL parameter").into_response();
        };
        let origin = origin(&url).unwrap_or_default();

        let response = match self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::REFERER, format!("{origin}/"))
            .header(reqwest::header::ORIGIN, &origin)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Relay request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };

        let upstream_status = response.status();
        if !upstream_status.is_success() {
            tracing::debug!(url = %url, status = %upstream_status, "Upstream rejected relay request");
            let status = StatusCode::from_u16(upstream_status.as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let reason = upstream_status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| upstream_status.as_u16().to_string());
            return (status, format!("Failed to fetch stream: {reason}")).into_response();
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or(&self.default_content_type)
            .to_string();

        let content_length: Option<u64> = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|cl| cl.to_str().ok())
            .and_then(|cl| cl.parse().ok());

        tracing::debug!(
            url = %url,
            content_type = %content_type,
            content_length = ?content_length,
            "Relaying stream"
        );

        // Pulled chunk by chunk as the client reads, so backpressure reaches
        // the upstream connection.
        let body = Body::from_stream(response.bytes_stream());

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");

        if let Some(length) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }

        match builder.body(body) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to build relay response: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Relay a third-party URL through this origin.
///
/// GET /api/stream?url={target}
pub async fn stream(
    State(ctx): State<AppContext>,
    Query(params): Query<StreamParams>,
) -> Response {
    ctx.relay.relay(params.url.as_deref()).await
}
